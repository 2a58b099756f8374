/// Generates `api_docs()` for a module from its documented handlers.
#[macro_export]
macro_rules! publish_api_docs {
    ($($end_point:ident),+) => {
        #[cfg(feature = "openapi")]
        #[derive(utoipa::OpenApi)]
        #[openapi(paths($($end_point),+))]
        struct ModuleDocs;

        #[cfg(feature = "openapi")]
        pub fn api_docs() -> utoipa::openapi::OpenApi {
            use utoipa::OpenApi as _;
            ModuleDocs::openapi()
        }
    };
}

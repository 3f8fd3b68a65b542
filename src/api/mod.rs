pub mod convert;
pub mod headers;
pub mod health;
pub mod process;
pub mod rate_limit;
pub mod upload;

pub use convert::{handle_convert_image, ConvertImageForm, __path_handle_convert_image};
pub use health::{handle_health, HealthResponse, __path_handle_health};
pub use process::{handle_process_image, ProcessImageForm, __path_handle_process_image};
pub use rate_limit::enforce_rate_limit;
pub use upload::Upload;

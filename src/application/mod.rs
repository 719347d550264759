pub mod app_error;
pub mod helpers;
pub mod propagation;
pub mod use_cases;

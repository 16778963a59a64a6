pub mod capture;
pub mod course;
pub mod loaders;
pub mod site_profile;

pub use capture::{CaptureOutcome, CaptureResult, FailureKind};
pub use course::{Course, Lesson};
pub use loaders::load_site_profile;
pub use site_profile::SiteProfile;

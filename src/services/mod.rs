pub mod capability;
pub mod cookie_store;
pub mod lesson_enumerator;
pub mod page_capturer;
pub mod pdf_assembler;
pub mod session_authenticator;
pub mod summary_writer;

pub use capability::{Authenticator, LessonSource, PageCapturer};
pub use cookie_store::{CookieStore, StoredCookie};
pub use lesson_enumerator::ChromeLessonEnumerator;
pub use page_capturer::{validate_raster, ChromePageCapturer};
pub use session_authenticator::{BrowserSession, ChromeAuthenticator};
pub use summary_writer::SummaryWriter;

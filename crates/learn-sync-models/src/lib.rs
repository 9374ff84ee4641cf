pub mod completion;
pub mod course;
pub mod progress;
pub mod status;
pub mod user;
pub mod watchlist;

pub use completion::QuizCompletionRecord;
pub use course::CourseSnapshot;
pub use progress::ProgressSnapshot;
pub use status::WatchlistStatus;
pub use user::UserRecord;
pub use watchlist::WatchlistEntry;

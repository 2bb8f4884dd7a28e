//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod comment_repo;
pub mod ticket_repo;
pub mod user_repo;
pub mod vote_repo;

pub use category_repo::CategoryRepo;
pub use comment_repo::CommentRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
pub use vote_repo::VoteRepo;

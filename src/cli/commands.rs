pub mod create_test_user;
pub mod initdb;
pub mod serve;

pub use create_test_user::create_test_user;
pub use initdb::init_database;
pub use serve::serve;

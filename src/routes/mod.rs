pub mod admin;
pub mod auth;
pub mod booklists;
pub mod chat;
pub mod favorites;
pub mod health;
pub mod reviews;
pub mod users;
pub mod validation;
pub mod votes;

pub use admin::admin_stats;
pub use auth::{current_user, login_user, logout_user, register_user};
pub use booklists::{
    add_book_to_list, create_list, delete_list, get_list, list_containing_book, my_lists,
    public_lists, remove_book_from_list, update_book_in_list, update_list,
};
pub use chat::chat_completion;
pub use favorites::{add_favorite, favorites_contains, get_favorites, remove_favorite};
pub use health::health_check;
pub use reviews::{
    create_review, delete_review, dislike_review, like_review, list_reviews, update_review,
};
pub use users::{deactivate_account, get_user, list_users, update_profile};
pub use validation::page_window;
pub use votes::{cast_vote, list_votes, my_votes, remove_vote, vote_stats};

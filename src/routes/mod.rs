mod auth;
mod health_check;
mod users;

pub use auth::{
    activate_user, current_user, login, logout, refresh_session, register, social_auth,
};
pub use health_check::health_check;
pub use users::{
    delete_user, get_all_users, update_password, update_user_info, update_user_role,
};

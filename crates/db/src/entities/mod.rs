//! `SeaORM` entity definitions.

pub mod account_sets;
pub mod contact_books;
pub mod site_settings;
pub mod users;

/// Commonly used entity aliases.
pub mod prelude {
    pub use super::account_sets::Entity as AccountSets;
    pub use super::contact_books::Entity as ContactBooks;
    pub use super::site_settings::Entity as SiteSettings;
    pub use super::users::Entity as Users;
}

//! Tattoo Oracle API Library
//!
//! This library turns a person's name, date of birth and age into a "tattoo
//! reading": zodiac sign and life path number are derived locally, then a text
//! model writes the reading and an image model draws it. Both model calls go
//! through ordered provider chains that fall back to the next service on failure.
//!
//! # Modules
//!
//! - `astrology`: Zodiac sign and life path number.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and shared state.
//! - `image_store`: Saving generated images to disk.
//! - `models`: Request, reading and response models.
//! - `prompt`: Prompt construction for text and image providers.
//! - `providers`: Provider chain plus text and image provider clients.
//! - `validation`: Request validation.

pub mod astrology;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod image_store;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod validation;

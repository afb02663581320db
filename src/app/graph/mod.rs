mod build;
mod interaction;
mod scene;
mod view;

pub(in crate::app) use scene::{ARTIST_FILL, GENRE_FILL};

pub mod assets;
pub mod audio;
pub mod captions;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod mapper;
pub mod observer;
pub mod resize;
pub mod widget;
pub mod tasks {
    pub mod loader;
    pub mod resize;
}

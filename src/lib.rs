pub mod board;
pub mod geometry;
pub mod gui;
pub mod interaction;
pub mod logging;
pub mod storage;
pub mod theme;

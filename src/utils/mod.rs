pub mod color;
pub mod coords;
pub mod profiler;
pub mod vector;

// 音频处理模块
//
// 子模块：
// - decoder: 调用 ffmpeg 将任意音视频转为 44.1kHz/16bit/立体声 PCM
// - separator: 调用 audio-separator 分离目标轨道
// - resolver: 在分离输出目录中定位目标轨道文件

pub mod decoder;
pub mod resolver;
pub mod separator;

pub use decoder::MediaDecoder;
pub use resolver::{resolve, select_stem};
pub use separator::Separator;

//! Data Transfer Objects
//!
//! WebSocket と HTTP の境界で使うデータ形式を定義します。
//! ドメインモデルとの変換はこのモジュールで行います。

pub mod http;
pub mod websocket;

//! In-memory collaborator implementations.
//!
//! ドメイン層が定義する `ChatStore` / `IdentityProvider` trait の具体的な実装。
//! 永続化は行わず、プロセスの生存期間だけデータを保持します。

mod inmemory_chat;
mod inmemory_sessions;

pub use inmemory_chat::{DEFAULT_GROUP_ID, DEFAULT_ROOM_ID, InMemoryChatStore};
pub use inmemory_sessions::InMemorySessions;

//! インメモリ ChatStore 実装

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatStore, GroupId, Identity, MessageContent, MessageId, PersistedMessage, RoomId, RoomInfo,
    StoreError, Timestamp, UserId,
};
use roomcast_shared::time::{Clock, SystemClock};

/// Group created on construction; every seeded user belongs to it
pub const DEFAULT_GROUP_ID: GroupId = GroupId::new(1);
/// `#general` room of the default group
pub const DEFAULT_ROOM_ID: RoomId = RoomId::new(1);

#[derive(Debug)]
struct GroupRecord {
    name: String,
    members: HashSet<UserId>,
}

#[derive(Debug, Default)]
struct StoreState {
    groups: HashMap<GroupId, GroupRecord>,
    rooms: HashMap<RoomId, RoomInfo>,
    messages: Vec<PersistedMessage>,
    last_seen: HashMap<UserId, Timestamp>,
    next_group_id: i64,
    next_room_id: i64,
    next_message_id: i64,
}

/// In-memory groups, rooms, memberships and message history.
pub struct InMemoryChatStore {
    clock: Arc<dyn Clock>,
    state: Mutex<StoreState>,
}

impl InMemoryChatStore {
    /// Create a store with the default group and its `#general` room
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let mut state = StoreState {
            next_group_id: DEFAULT_GROUP_ID.value(),
            next_room_id: DEFAULT_ROOM_ID.value(),
            next_message_id: 1,
            ..StoreState::default()
        };
        let group_id = state.allocate_group("default");
        state.allocate_room(group_id, "#general");

        Self {
            clock,
            state: Mutex::new(state),
        }
    }

    pub async fn create_group(&self, name: &str) -> GroupId {
        let mut state = self.state.lock().await;
        state.allocate_group(name)
    }

    pub async fn create_room(&self, group_id: GroupId, name: &str) -> Result<RoomId, StoreError> {
        let mut state = self.state.lock().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound(format!("group {}", group_id)));
        }
        Ok(state.allocate_room(group_id, name))
    }

    pub async fn add_member(&self, group_id: GroupId, user_id: UserId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let group = state
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| StoreError::NotFound(format!("group {}", group_id)))?;
        group.members.insert(user_id);
        tracing::debug!("User {} added to group '{}'", user_id, group.name);
        Ok(())
    }

    /// Stored messages of a room, oldest first
    pub async fn messages(&self, room_id: RoomId) -> Vec<PersistedMessage> {
        let state = self.state.lock().await;
        state
            .messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect()
    }

    pub async fn last_seen(&self, user_id: UserId) -> Option<Timestamp> {
        let state = self.state.lock().await;
        state.last_seen.get(&user_id).copied()
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl StoreState {
    fn allocate_group(&mut self, name: &str) -> GroupId {
        let id = GroupId::new(self.next_group_id);
        self.next_group_id += 1;
        self.groups.insert(
            id,
            GroupRecord {
                name: name.to_string(),
                members: HashSet::new(),
            },
        );
        id
    }

    fn allocate_room(&mut self, group_id: GroupId, name: &str) -> RoomId {
        let id = RoomId::new(self.next_room_id);
        self.next_room_id += 1;
        self.rooms.insert(
            id,
            RoomInfo {
                id,
                group_id,
                name: name.to_string(),
            },
        );
        id
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn is_member(&self, user_id: UserId, group_id: GroupId) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .groups
            .get(&group_id)
            .is_some_and(|group| group.members.contains(&user_id)))
    }

    async fn resolve_room(&self, room_id: RoomId) -> Result<RoomInfo, StoreError> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(&room_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("room {}", room_id)))
    }

    async fn persist_message(
        &self,
        room_id: RoomId,
        author: Identity,
        content: MessageContent,
    ) -> Result<PersistedMessage, StoreError> {
        let created_at = Timestamp::new(self.clock.now_millis());
        let mut state = self.state.lock().await;
        if !state.rooms.contains_key(&room_id) {
            return Err(StoreError::NotFound(format!("room {}", room_id)));
        }

        let message = PersistedMessage {
            id: MessageId::new(state.next_message_id),
            room_id,
            user_id: author.user_id,
            username: author.username,
            content: content.as_str().trim().to_string(),
            created_at,
        };
        state.next_message_id += 1;
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn touch_last_seen(&self, user_id: UserId) -> Result<(), StoreError> {
        let now = Timestamp::new(self.clock.now_millis());
        let mut state = self.state.lock().await;
        state.last_seen.insert(user_id, now);
        Ok(())
    }
}

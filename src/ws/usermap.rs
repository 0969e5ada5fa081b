use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use crate::dtos::NotificationDTO;

pub enum InternalSignal {
    Shutdown,
    Notification(NotificationDTO),
}

pub struct UserMap {
    users_online: DashMap<i32, UnboundedSender<InternalSignal>>,
}

impl Default for UserMap {
    fn default() -> Self {
        Self::new()
    }
}

impl UserMap {
    pub fn new() -> Self {
        UserMap {
            users_online: DashMap::new(),
        }
    }

    #[instrument(skip(self, tx), fields(user_id = %user_id))]
    pub fn register_online(&self, user_id: i32, tx: UnboundedSender<InternalSignal>) {
        info!("Registering user {} as online", user_id);
        self.users_online.insert(user_id, tx);
        info!("Total online users: {}", self.users_online.len());
    }

    /// Removes the user only if `tx` is still the registered sender: a newer
    /// connection of the same user stays online.
    #[instrument(skip(self, tx), fields(user_id = %user_id))]
    pub fn remove_from_online(&self, user_id: &i32, tx: &UnboundedSender<InternalSignal>) -> bool {
        let removed = self
            .users_online
            .remove_if(user_id, |_, registered| registered.same_channel(tx))
            .is_some();
        if removed {
            info!("Removing user from online");
        } else {
            debug!("Connection already replaced, keeping the newer one");
        }
        removed
    }

    /// Best effort: returns whether the signal was handed to a live connection.
    #[instrument(skip(self, message), fields(user_id = %user_id))]
    pub fn send_server_message_if_online(&self, user_id: &i32, message: InternalSignal) -> bool {
        let message_type = match &message {
            InternalSignal::Shutdown => "Shutdown",
            InternalSignal::Notification(n) => {
                debug!("Pushing notification {} ({:?})", n.notification_id, n.kind);
                "Notification"
            }
        };

        if let Some(entry) = self.users_online.get(user_id) {
            let tx = entry.value();
            if let Err(e) = tx.send(message) {
                warn!("Failed to send {} message to user: {:?}", message_type, e);
                false
            } else {
                info!("{} message sent to online user", message_type);
                true
            }
        } else {
            debug!("User {} not online, {} message not sent", user_id, message_type);
            false
        }
    }

    pub fn online_count(&self) -> usize {
        self.users_online.len()
    }

    pub fn is_user_online(&self, user_id: &i32) -> bool {
        self.users_online.contains_key(user_id)
    }
}

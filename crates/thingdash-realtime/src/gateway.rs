//! The presence registry and realtime gateway.
//!
//! One gateway is constructed per server process and threaded through
//! dependency injection to every consumer. Every presence change
//! round-trips the injected [`PresenceStore`]; the registry only maps
//! socket ids to live transport handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use thingdash_auth::{Claims, JwtDecoder, strip_bearer};
use thingdash_core::config::RealtimeConfig;
use thingdash_core::error::AppError;
use thingdash_core::result::AppResult;
use thingdash_database::PresenceStore;

use crate::handle::SocketHandle;
use crate::protocol::{Ack, Envelope, user_room};
use crate::registry::SocketRegistry;

/// Central realtime gateway: handshake gate, presence binding, and the
/// emit-to-user push primitive.
#[derive(Clone)]
pub struct RealtimeGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    config: RealtimeConfig,
    store: Arc<dyn PresenceStore>,
    decoder: Arc<JwtDecoder>,
    registry: SocketRegistry,
    started: AtomicBool,
}

impl std::fmt::Debug for RealtimeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeGateway")
            .field("started", &self.is_started())
            .finish()
    }
}

impl RealtimeGateway {
    /// Creates the gateway. Called exactly once during process startup.
    pub fn new(
        config: RealtimeConfig,
        store: Arc<dyn PresenceStore>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                config,
                store,
                decoder,
                registry: SocketRegistry::new(),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Arms the handshake gate and connection handling.
    ///
    /// Until this is called every transport-dependent operation fails
    /// fast with a gateway error. Starting twice is a caller error and
    /// is rejected.
    pub fn start(&self) -> AppResult<()> {
        if self
            .inner
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::conflict("Realtime gateway already started"));
        }
        info!("Realtime gateway started");
        Ok(())
    }

    /// Whether `start` has been called.
    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    fn ensure_started(&self) -> AppResult<()> {
        if self.is_started() {
            Ok(())
        } else {
            Err(AppError::gateway("Realtime gateway has not been started"))
        }
    }

    /// Runs the handshake gate over an inbound connection's credential.
    ///
    /// The credential may carry an optional `"Bearer "` prefix. The raw
    /// verification error is logged but not surfaced to the client.
    pub fn authenticate(&self, credential: Option<&str>) -> AppResult<Claims> {
        self.ensure_started()?;

        let raw = credential
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::authentication("Missing authentication token"))?;

        self.inner
            .decoder
            .decode(strip_bearer(raw))
            .map_err(|e| {
                debug!(error = %e, "Handshake credential rejected");
                AppError::authentication("Invalid authentication token")
            })
    }

    /// Admits an authenticated connection.
    ///
    /// Returns the connection handle and the receiver half of its
    /// outbound queue, to be drained into the transport sink.
    pub fn attach(&self, claims: Claims) -> AppResult<(Arc<SocketHandle>, mpsc::Receiver<Envelope>)> {
        self.ensure_started()?;

        let (tx, rx) = mpsc::channel(self.inner.config.channel_buffer_size);
        let handle = Arc::new(SocketHandle::new(claims, tx));
        self.inner.registry.register(handle.clone());

        info!(
            socket_id = %handle.id,
            user_id = %handle.claims.sub,
            "Connection admitted"
        );

        Ok((handle, rx))
    }

    /// `addUser`: bind this connection to a user identity.
    ///
    /// Updates the stored socket id when it differs from this connection
    /// and always re-subscribes the connection to the user's room.
    pub async fn add_user(&self, handle: &SocketHandle, user_id: Uuid) -> Ack {
        let user = match self.inner.store.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Ack::err("User does not exist"),
            Err(e) => {
                warn!(error = %e, %user_id, "addUser: presence lookup failed");
                return Ack::err(e.message);
            }
        };

        if user.socket_id != Some(handle.id) {
            if let Err(e) = self
                .inner
                .store
                .update_socket(user_id, Some(handle.id))
                .await
            {
                warn!(error = %e, %user_id, "addUser: presence update failed");
                return Ack::err(e.message);
            }
        }

        // Re-subscribe even when the stored id already matched.
        self.inner.registry.join_room(&user_room(user_id), handle.id);

        debug!(socket_id = %handle.id, %user_id, "Connection bound to user");
        Ack::bound(user_id)
    }

    /// `removeUser`: clear a user's presence record.
    ///
    /// Any connection may clear any user's presence by id; the stored
    /// socket id is not checked against the caller. Clearing an already
    /// offline user still succeeds.
    pub async fn remove_user(&self, user_id: Uuid) -> Ack {
        let user = match self.inner.store.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Ack::err("User does not exist"),
            Err(e) => {
                warn!(error = %e, %user_id, "removeUser: presence lookup failed");
                return Ack::err(e.message);
            }
        };

        if user.socket_id.is_some() {
            if let Err(e) = self.inner.store.update_socket(user_id, None).await {
                warn!(error = %e, %user_id, "removeUser: presence update failed");
                return Ack::err(e.message);
            }
        }

        Ack::ok("Presence cleared")
    }

    /// `checkSocket`: reconcile the stored socket id with this connection.
    pub async fn check_socket(&self, handle: &SocketHandle, user_id: Uuid) -> Ack {
        let user = match self.inner.store.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Ack::err("User does not exist"),
            Err(e) => {
                warn!(error = %e, %user_id, "checkSocket: presence lookup failed");
                return Ack::err(e.message);
            }
        };

        if user.socket_id != Some(handle.id) {
            if let Err(e) = self
                .inner
                .store
                .update_socket(user_id, Some(handle.id))
                .await
            {
                warn!(error = %e, %user_id, "checkSocket: presence update failed");
                return Ack::err(e.message);
            }
            return Ack::ok("Socket was updated");
        }

        Ack::ok("Socket is up to date")
    }

    /// Transport-initiated disconnect cleanup.
    ///
    /// Looks the presence record up by this connection's own socket id,
    /// never by claimed identity, and clears it when found. Failures are
    /// logged only; disconnect handling must never crash the process.
    pub async fn handle_disconnect(&self, socket_id: Uuid) {
        match self.inner.store.find_by_socket(socket_id).await {
            Ok(Some(user)) => {
                if let Err(e) = self.inner.store.update_socket(user.id, None).await {
                    warn!(error = %e, %socket_id, "Disconnect cleanup failed to clear presence");
                } else {
                    debug!(%socket_id, user_id = %user.id, "Presence cleared on disconnect");
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, %socket_id, "Disconnect cleanup lookup failed");
            }
        }

        if let Some(handle) = self.inner.registry.unregister(socket_id) {
            handle.mark_dead();
        }
    }

    /// Best-effort push to a single user's active connection.
    ///
    /// Unknown user, offline user, store failure, or an unreachable
    /// connection are all fire-and-forget failures: logged, never
    /// surfaced. Callers typically discard the result.
    pub async fn emit_to_user(&self, user_id: Uuid, event: &str, data: Value) -> AppResult<()> {
        self.ensure_started()?;

        let user = match self.inner.store.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(%user_id, event, "Push dropped: unknown user");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, %user_id, event, "Push dropped: presence lookup failed");
                return Ok(());
            }
        };

        let Some(socket_id) = user.socket_id else {
            debug!(%user_id, event, "Push dropped: user offline");
            return Ok(());
        };

        match self.inner.registry.get(socket_id) {
            Some(handle) => {
                if !handle.send(Envelope::new(event, data)) {
                    warn!(%user_id, %socket_id, event, "Push dropped: connection unreachable");
                }
            }
            None => {
                debug!(%user_id, %socket_id, event, "Push dropped: stale socket id");
            }
        }

        Ok(())
    }

    /// Read-only access to the socket registry.
    pub fn registry(&self) -> &SocketRegistry {
        &self.inner.registry
    }
}

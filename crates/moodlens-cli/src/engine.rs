use moodlens_core::{FrameEvent, FrameReport, Mood, Session};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Messages sent from the frame source and the command layer to the engine thread.
enum EngineRequest {
    Start {
        reply: oneshot::Sender<Uuid>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    Frame {
        event: FrameEvent,
        reply: oneshot::Sender<Option<FrameReport>>,
    },
    CurrentMood {
        reply: oneshot::Sender<Mood>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineRequest,
    ) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    /// Start scanning. Returns the session id.
    pub async fn start(&self) -> Result<Uuid, EngineError> {
        self.request(|reply| EngineRequest::Start { reply }).await
    }

    pub async fn stop(&self) -> Result<(), EngineError> {
        self.request(|reply| EngineRequest::Stop { reply }).await
    }

    /// Feed one detector callback. `None` means the session was not scanning
    /// and the frame was dropped.
    pub async fn frame(&self, event: FrameEvent) -> Result<Option<FrameReport>, EngineError> {
        self.request(|reply| EngineRequest::Frame { event, reply })
            .await
    }

    pub async fn current_mood(&self) -> Result<Mood, EngineError> {
        self.request(|reply| EngineRequest::CurrentMood { reply })
            .await
    }
}

/// Spawn the engine on a dedicated OS thread that owns `session`.
///
/// Requests are served strictly in arrival order, so frame processing and
/// start/stop never interleave. The thread exits once every handle is dropped.
pub fn spawn_engine(mut session: Session) -> Result<EngineHandle, EngineError> {
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(16);

    std::thread::Builder::new()
        .name("moodlens-engine".into())
        .spawn(move || {
            tracing::info!(session = %session.id(), "engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Start { reply } => {
                        session.start();
                        let _ = reply.send(session.id());
                    }
                    EngineRequest::Stop { reply } => {
                        session.stop();
                        let _ = reply.send(());
                    }
                    EngineRequest::Frame { event, reply } => {
                        let _ = reply.send(session.process(event));
                    }
                    EngineRequest::CurrentMood { reply } => {
                        let _ = reply.send(session.current_mood());
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })
        .map_err(EngineError::Spawn)?;

    Ok(EngineHandle { tx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodlens_core::landmarks::mesh;
    use moodlens_core::{ClassifierKind, LandmarkSet, NetworkConfig, Point, RuleSet, SessionConfig};
    use std::time::Duration;

    fn face() -> LandmarkSet {
        let mut pts = vec![Point::new(0.5, 0.5); mesh::FACE_MESH_POINTS];
        pts[mesh::LEFT_EYE_OUTER] = Point::new(0.30, 0.40);
        pts[mesh::LEFT_EYE_INNER] = Point::new(0.40, 0.40);
        pts[mesh::LEFT_EYE_TOP] = Point::new(0.35, 0.385);
        pts[mesh::LEFT_EYE_BOTTOM] = Point::new(0.35, 0.415);
        pts[mesh::RIGHT_EYE_INNER] = Point::new(0.60, 0.40);
        pts[mesh::RIGHT_EYE_OUTER] = Point::new(0.70, 0.40);
        pts[mesh::RIGHT_EYE_TOP] = Point::new(0.65, 0.385);
        pts[mesh::RIGHT_EYE_BOTTOM] = Point::new(0.65, 0.415);
        pts[mesh::MOUTH_LEFT] = Point::new(0.42, 0.70);
        pts[mesh::MOUTH_RIGHT] = Point::new(0.58, 0.70);
        pts[mesh::UPPER_LIP] = Point::new(0.50, 0.70);
        pts[mesh::FOREHEAD] = Point::new(0.50, 0.15);
        pts[mesh::CHIN] = Point::new(0.50, 0.90);
        LandmarkSet::new(pts).unwrap()
    }

    fn engine() -> EngineHandle {
        let classifier = moodlens_core::build_classifier(
            ClassifierKind::Rules,
            RuleSet::default(),
            &NetworkConfig::default(),
        );
        spawn_engine(Session::new(SessionConfig::default(), classifier)).unwrap()
    }

    #[tokio::test]
    async fn test_frames_dropped_before_start() {
        let engine = engine();
        let report = engine
            .frame(FrameEvent::NoFace {
                at: Duration::ZERO,
            })
            .await
            .unwrap();
        assert!(report.is_none());
    }

    #[tokio::test]
    async fn test_scan_lifecycle() {
        let engine = engine();
        let first = engine.start().await.unwrap();

        let report = engine
            .frame(FrameEvent::Face {
                landmarks: face(),
                at: Duration::from_millis(33),
            })
            .await
            .unwrap();
        let Some(FrameReport::Analyzed(readout)) = report else {
            panic!("expected an analysed frame, got {report:?}");
        };
        assert_eq!(readout.identity.to_string(), "User #1 (registered)");
        assert_eq!(engine.current_mood().await.unwrap(), readout.mood);

        let report = engine
            .frame(FrameEvent::NoFace {
                at: Duration::from_millis(66),
            })
            .await
            .unwrap();
        assert_eq!(report, Some(FrameReport::NotFound));

        engine.stop().await.unwrap();
        let late = engine
            .frame(FrameEvent::Face {
                landmarks: face(),
                at: Duration::from_millis(99),
            })
            .await
            .unwrap();
        assert!(late.is_none());

        // same session across restarts
        assert_eq!(engine.start().await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_handles_share_one_session() {
        let engine = engine();
        let other = engine.clone();
        engine.start().await.unwrap();
        let report = other
            .frame(FrameEvent::NoFace {
                at: Duration::ZERO,
            })
            .await
            .unwrap();
        assert_eq!(report, Some(FrameReport::NotFound));
    }
}

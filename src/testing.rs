//! Scripted gateway for controller and tracker tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::error::GatewayError;
use crate::gateway::{Request, RequestGateway};

type Reply = Result<Value, GatewayError>;

enum Scripted {
    Ready(Reply),
    Held(oneshot::Receiver<Reply>),
}

/// Answers requests from a queue, in order. A held reply resolves only when
/// the test sends on its channel, which lets a test look at the store while
/// the mutation is pending.
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, reply: Reply) {
        self.script.lock().unwrap().push_back(Scripted::Ready(reply));
    }

    pub fn ok(&self, payload: Value) {
        self.reply(Ok(payload));
    }

    pub fn fail(&self, err: GatewayError) {
        self.reply(Err(err));
    }

    /// Queue a reply the test releases later
    pub fn hold(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().push_back(Scripted::Held(rx));
        tx
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestGateway for ScriptedGateway {
    async fn send(&self, request: Request) -> Result<Value, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Held(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(GatewayError::NetworkUnreachable("reply dropped".into()))),
            None => Err(GatewayError::NetworkUnreachable(format!("no scripted reply for {}", request))),
        }
    }
}

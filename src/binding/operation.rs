//! Bound operations.
//!
//! An `Operation` is the callable produced by binding an endpoint descriptor
//! to a client: resolve the arguments, execute through the pool under the
//! timeout and retry policies, then decode the response into the declared
//! type. Per call the state machine is Resolving → Executing → Decoding →
//! Done, or Failed at any stage; calls share nothing and run concurrently.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::binding::{resolve, CallArguments, EndpointDescriptor};
use crate::codec::Codec;
use crate::error::{ClientError, ClientResult};
use crate::executor::RequestExecutor;

/// A callable remote operation with response type `Res`.
pub struct Operation<Res, C: Codec> {
    descriptor: Arc<EndpointDescriptor>,
    base_url: Url,
    executor: Arc<RequestExecutor>,
    codec: C,
    _response: PhantomData<fn() -> Res>,
}

impl<Res, C> Operation<Res, C>
where
    Res: DeserializeOwned + Default,
    C: Codec,
{
    pub(crate) fn new(
        descriptor: EndpointDescriptor,
        base_url: Url,
        executor: Arc<RequestExecutor>,
        codec: C,
    ) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            base_url,
            executor,
            codec,
            _response: PhantomData,
        }
    }

    /// Execute the operation with the given arguments.
    ///
    /// A 2xx response is decoded into `Res` (an empty body decodes to
    /// `Res::default()`); any other status is returned as
    /// `ClientError::Application` with the raw body attached.
    pub async fn call<B: Serialize>(&self, args: CallArguments<'_, B>) -> ClientResult<Res> {
        let request = resolve(&self.descriptor, &self.base_url, &args, &self.codec)?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            "executing bound operation"
        );

        let response = self.executor.execute(&request).await?;
        if !response.status.is_success() {
            return Err(ClientError::Application {
                status: response.status,
                body: response.body,
            });
        }
        self.codec.decode(&response.body)
    }

    pub fn descriptor(&self) -> &EndpointDescriptor {
        &self.descriptor
    }
}

impl<Res, C: Codec> std::fmt::Debug for Operation<Res, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("method", self.descriptor.method())
            .field("path_template", &self.descriptor.path_template())
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

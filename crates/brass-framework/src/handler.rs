//! Handler functions.
//!
//! Handlers are plain async functions whose parameters implement
//! [`FromContext`] and whose return type implements [`HandlerResponse`]. The
//! [`Handler`] trait is implemented for such functions of up to six
//! parameters, in the style of Axum handlers.
//!
//! ```rust,ignore
//! async fn help() -> &'static str {
//!     "指令：help、待辦：<內容>、股票：<代號>"
//! }
//!
//! async fn stock(content: Content, api: Api) -> Result<String, ApiError> {
//!     api.quote(content.as_str()).await.map(|q| q.to_string())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::BotContext;
use crate::error::{HandlerError, HandlerResult};
use crate::extractor::FromContext;

// ============================================================================
// HandlerResponse
// ============================================================================

/// A value a handler can return.
///
/// Text values are sent back to the conversation; errors become
/// [`HandlerError::Failed`] and are handled by the dispatcher's failure
/// policy.
#[async_trait]
pub trait HandlerResponse: Send {
    /// Performs the reply, if any.
    async fn into_reply(self, ctx: &BotContext) -> HandlerResult;
}

#[async_trait]
impl HandlerResponse for () {
    async fn into_reply(self, _ctx: &BotContext) -> HandlerResult {
        Ok(())
    }
}

#[async_trait]
impl HandlerResponse for String {
    async fn into_reply(self, ctx: &BotContext) -> HandlerResult {
        ctx.reply(&self).await?;
        Ok(())
    }
}

#[async_trait]
impl HandlerResponse for &'static str {
    async fn into_reply(self, ctx: &BotContext) -> HandlerResult {
        ctx.reply(self).await?;
        Ok(())
    }
}

/// `None` sends nothing.
#[async_trait]
impl<T: HandlerResponse> HandlerResponse for Option<T> {
    async fn into_reply(self, ctx: &BotContext) -> HandlerResult {
        match self {
            Some(t) => t.into_reply(ctx).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<T, E> HandlerResponse for Result<T, E>
where
    T: HandlerResponse,
    E: std::fmt::Display + Send,
{
    async fn into_reply(self, ctx: &BotContext) -> HandlerResult {
        match self {
            Ok(t) => t.into_reply(ctx).await,
            Err(e) => Err(HandlerError::failed(e)),
        }
    }
}

// ============================================================================
// Handler
// ============================================================================

/// An async function usable as a command handler.
///
/// Implemented for `async fn`s and closures taking 0-6 [`FromContext`]
/// parameters and returning a [`HandlerResponse`].
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Extracts the parameters from `ctx`, runs the handler and sends its
    /// reply.
    async fn call(self, ctx: Arc<BotContext>) -> HandlerResult;
}

/// A type-erased handler.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<BotContext>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Erases a handler's parameter types.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(move |ctx| f.clone().call(ctx))
}

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandlerResponse + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            async fn call(self, ctx: Arc<BotContext>) -> HandlerResult {
                $(
                    let $ty = $ty::from_context(&ctx)?;
                )*

                let res = (self)($($ty,)*).await;
                res.into_reply(&ctx).await
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);

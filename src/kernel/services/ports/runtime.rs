use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<T = ()> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

pub trait AsyncExecutor: Send + Sync {
    fn spawn(&self, task: BoxFuture);
}

/// Executes the effects it knows how to perform.
///
/// Anything it does not handle is handed back to the caller.
pub trait EffectRunner: Send + Sync {
    fn run(&self, effect: crate::kernel::Effect) -> Option<crate::kernel::Effect>;
}

use knob_kernel::{BindError, RegistryError};
use std::borrow::Cow;

/// REST configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("REST registry error{}: {source}", format_context(.context))]
    Registry {
        #[source]
        source: RegistryError,
        context: Option<Cow<'static, str>>,
    },

    #[error("REST binding error{}: {source}", format_context(.context))]
    Bind {
        #[source]
        source: BindError,
        context: Option<Cow<'static, str>>,
    },
}

pub trait RestErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, RestError>;
}

impl<T> RestErrorExt<T> for Result<T, RestError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                RestError::Registry { context: c, .. } | RestError::Bind { context: c, .. } => {
                    *c = Some(context.into());
                },
            }
            e
        })
    }
}

impl<T> RestErrorExt<T> for Result<T, BindError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, RestError> {
        self.map_err(|source| RestError::Bind { source, context: Some(context.into()) })
    }
}

impl From<RegistryError> for RestError {
    #[inline]
    fn from(source: RegistryError) -> Self {
        Self::Registry { source, context: None }
    }
}

impl From<BindError> for RestError {
    #[inline]
    fn from(source: BindError) -> Self {
        Self::Bind { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

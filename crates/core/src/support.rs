//! The execution dispatcher seam.

use crate::{AiServiceContext, MethodDescriptor};
use std::{any::Any, sync::Arc};

/// Arguments of one generated method call.
pub struct MethodInput<'a> {
    /// The service context, absent for unbound instances.
    pub context: Option<&'a Arc<AiServiceContext>>,
    /// Descriptor of the called method.
    pub create_info: &'a MethodDescriptor,
    /// Boxed arguments in declaration order.
    pub params: Vec<Box<dyn Any + Send>>,
}

impl<'a> MethodInput<'a> {
    /// Package one call.
    pub fn new(
        context: Option<&'a Arc<AiServiceContext>>,
        create_info: &'a MethodDescriptor,
        params: Vec<Box<dyn Any + Send>>,
    ) -> Self {
        Self {
            context,
            create_info,
            params,
        }
    }

    /// Borrow the argument at `position` as `T`.
    pub fn param<T: 'static>(&self, position: usize) -> Option<&T> {
        self.params.get(position)?.downcast_ref::<T>()
    }
}

/// Builds the prompt, calls the model and converts the answer.
///
/// The returned value must have the declared return type of the method
/// described by `input.create_info`.
pub trait MethodImplementationSupport: Send + Sync {
    /// Execute one call.
    fn implement(&self, input: MethodInput<'_>) -> Box<dyn Any + Send>;
}

/// Unbox a dispatcher result into the declared return type.
///
/// # Panics
///
/// Panics when the dispatcher returned a value of another type, which breaks
/// the [`MethodImplementationSupport`] contract.
pub fn into_return<T: 'static>(value: Box<dyn Any + Send>, interface: &str, method_id: &str) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => panic!(
            "dispatcher returned a value of the wrong type for {interface}::{method_id}, expected {}",
            std::any::type_name::<T>()
        ),
    }
}

//! Tier C: fixed-shape closures.

use std::{any::Any, fmt, sync::Arc};

use crate::{
    property::{BoundProperty, PropertyHandle},
    typesystem::{DirectAccess, Invoker, ReadFn, Value, WriteFn},
    Result,
};

/// A property handle holding one `(target) -> value` and one `(target, value) -> ()` closure.
///
/// Accessors registered through the typed builder helpers already carry such closures and are
/// called directly. Accessors with only an erased body get a closure around their bound
/// [`Invoker`], so every property ends up with the same call shape.
#[derive(Clone)]
pub struct CompiledProperty {
    name: String,
    reader: Option<ReadFn>,
    writer: Option<WriteFn>,
}

impl CompiledProperty {
    /// Compile the accessors of a bound handle.
    #[must_use]
    pub fn new(bound: &BoundProperty) -> Self {
        let reader = bound.reader_method().zip(bound.reader()).map(|(method, invoker)| {
            match method.direct() {
                Some(DirectAccess::Read(direct)) => direct.clone(),
                _ => compile_reader(invoker.clone()),
            }
        });

        let writer = bound.writer_method().zip(bound.writer()).map(|(method, invoker)| {
            match method.direct() {
                Some(DirectAccess::Write(direct)) => direct.clone(),
                _ => compile_writer(invoker.clone()),
            }
        });

        CompiledProperty {
            name: bound.name().to_string(),
            reader,
            writer,
        }
    }
}

fn compile_reader(invoker: Invoker) -> ReadFn {
    Arc::new(move |target: &dyn Any| invoker.call_shared(target, Vec::new()))
}

fn compile_writer(invoker: Invoker) -> WriteFn {
    Arc::new(move |target: &mut dyn Any, value: Value| {
        invoker.call(target, vec![value]).map(|_| ())
    })
}

impl PropertyHandle for CompiledProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_readable(&self) -> bool {
        self.reader.is_some()
    }

    fn is_writable(&self) -> bool {
        self.writer.is_some()
    }

    fn read(&self, target: &dyn Any) -> Result<Option<Value>> {
        match &self.reader {
            Some(read) => read(target).map(Some),
            None => Ok(None),
        }
    }

    fn store(&self, target: &mut dyn Any, value: Value) -> Result<bool> {
        match &self.writer {
            Some(write) => {
                write(target, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl fmt::Debug for CompiledProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledProperty")
            .field("name", &self.name)
            .field("readable", &self.reader.is_some())
            .field("writable", &self.writer.is_some())
            .finish()
    }
}

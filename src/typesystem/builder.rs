//! Builder for type descriptors.
//!
//! [`TypeBuilder`] is handed to [`Introspect::describe`] and collects the fields, methods and
//! supertypes of one type. The typed helpers (`reader`, `writer`, `fluent_writer`, ...) erase
//! strongly typed closures into the dynamic [`Invoker`] shape and, at the same time, into a
//! fixed-shape [`DirectAccess`] closure. Both forms share one conversion path, so every handle
//! tier observes identical values and errors.
//!
//! Modifier methods such as [`TypeBuilder::exported`] or [`TypeBuilder::non_public`] apply to
//! the most recently added method.

use std::{
    any::{type_name, Any},
    convert::Infallible,
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use crate::{
    typesystem::{
        DirectAccess, FieldDescriptor, FieldFlags, Introspect, Invoker, MethodDescriptor,
        MethodFlags, PropertyMarker, PropertyValue, ReadFn, Receiver, SuperType, TypeDescriptor,
        TypeFlags, TypeKey, TypeKind, Value, ValueType, WriteFn,
    },
    Error, Result,
};

/// Collects the description of `T`.
///
/// `T` may be unsized: interfaces are described through their trait object type
/// (`TypeBuilder<dyn Trait>`), which only offers [`TypeBuilder::abstract_method`]. The typed
/// accessor helpers are available for sized types.
pub struct TypeBuilder<T: ?Sized + 'static> {
    key: TypeKey,
    kind: TypeKind,
    flags: TypeFlags,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    interfaces: Vec<SuperType>,
    base: Option<SuperType>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized + 'static> TypeBuilder<T> {
    pub(crate) fn new() -> Self {
        TypeBuilder {
            key: TypeKey::of::<T>(),
            kind: TypeKind::Class,
            flags: TypeFlags::PUBLIC,
            fields: Vec::new(),
            methods: Vec::new(),
            interfaces: Vec::new(),
            base: None,
            _marker: PhantomData,
        }
    }

    /// Describe `T` as an interface rather than a class.
    pub fn interface(&mut self) -> &mut Self {
        self.kind = TypeKind::Interface;
        self
    }

    /// Mark the type itself as not publicly visible.
    ///
    /// Accessors of such a type can only be called through privileged access.
    pub fn non_public_type(&mut self) -> &mut Self {
        self.flags.remove(TypeFlags::PUBLIC);
        self
    }

    /// Refuse privileged access to the type's members.
    pub fn restricted(&mut self) -> &mut Self {
        self.flags.insert(TypeFlags::RESTRICTED);
        self
    }

    /// Declare an instance field of type `F`.
    pub fn field<F: PropertyValue>(&mut self, name: &str) -> &mut Self {
        self.field_of(name, F::value_type(), FieldFlags::empty())
    }

    /// Declare a static field of type `F`.
    pub fn static_field<F: PropertyValue>(&mut self, name: &str) -> &mut Self {
        self.field_of(name, F::value_type(), FieldFlags::STATIC)
    }

    /// Declare a field with an explicit type and flags.
    pub fn field_of(&mut self, name: &str, ty: ValueType, flags: FieldFlags) -> &mut Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            ty,
            flags,
        });
        self
    }

    /// Declare that `T` implements the interface `I`.
    pub fn implements<I: Introspect + ?Sized>(&mut self) -> &mut Self {
        self.interfaces.push(SuperType::of::<I>());
        self
    }

    /// Declare `B` as the base type of `T`.
    ///
    /// The base takes part in subtype checks and marker lookup only. Its methods are not copied
    /// into `T`: an accessor inherited from `B` has to be declared again on `T` to become a
    /// property of `T`, since the base's bodies downcast to `B`.
    pub fn extends<B: Introspect>(&mut self) -> &mut Self {
        self.base = Some(SuperType::of::<B>());
        self
    }

    /// Declare a method without a body, as found on interfaces.
    pub fn abstract_method(
        &mut self,
        name: &str,
        params: &[ValueType],
        returns: ValueType,
    ) -> &mut Self {
        self.methods.push(MethodDescriptor {
            name: name.to_string(),
            declaring_type: self.key,
            params: params.to_vec(),
            returns,
            receiver: Receiver::Shared,
            flags: MethodFlags::PUBLIC | MethodFlags::ABSTRACT,
            marker: None,
            invoker: None,
            direct: None,
        });
        self
    }

    /// Mark the last added method as an explicit property accessor named after the method.
    pub fn exported(&mut self) -> &mut Self {
        self.with_last(|method| method.marker = Some(PropertyMarker::default()))
    }

    /// Mark the last added method as an explicit property accessor for `property`.
    pub fn exported_as(&mut self, property: &str) -> &mut Self {
        let marker = PropertyMarker {
            name: Some(property.to_string()),
        };
        self.with_last(|method| method.marker = Some(marker))
    }

    /// Make the last added method non-public.
    pub fn non_public(&mut self) -> &mut Self {
        self.with_last(|method| method.flags.remove(MethodFlags::PUBLIC))
    }

    /// Make the last added method static.
    pub fn static_method(&mut self) -> &mut Self {
        self.with_last(|method| method.flags.insert(MethodFlags::STATIC))
    }

    /// Make the last added method synthetic.
    pub fn synthetic(&mut self) -> &mut Self {
        self.with_last(|method| method.flags.insert(MethodFlags::SYNTHETIC))
    }

    fn with_last(&mut self, apply: impl FnOnce(&mut MethodDescriptor)) -> &mut Self {
        if let Some(method) = self.methods.last_mut() {
            apply(method);
        }
        self
    }

    fn push_method(
        &mut self,
        name: &str,
        params: Vec<ValueType>,
        returns: ValueType,
        receiver: Receiver,
        invoker: Invoker,
        direct: Option<DirectAccess>,
    ) -> &mut Self {
        self.methods.push(MethodDescriptor {
            name: name.to_string(),
            declaring_type: self.key,
            params,
            returns,
            receiver,
            flags: MethodFlags::PUBLIC,
            marker: None,
            invoker: Some(invoker),
            direct,
        });
        self
    }

    pub(crate) fn build(self) -> TypeDescriptor {
        let mut methods: Vec<Arc<MethodDescriptor>> =
            self.methods.into_iter().map(Arc::new).collect();
        if self.kind == TypeKind::Class {
            methods.push(Arc::new(universal_type_name(self.key)));
        }

        let mut supertypes = self.interfaces;
        supertypes.extend(self.base);

        TypeDescriptor {
            key: self.key,
            kind: self.kind,
            flags: self.flags,
            fields: self.fields,
            methods,
            supertypes,
        }
    }
}

impl<T: Any> TypeBuilder<T> {
    /// Add a reader: `fn name(&self) -> R`.
    pub fn reader<R, F>(&mut self, name: &str, read: F) -> &mut Self
    where
        R: PropertyValue,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        self.try_reader(name, move |target: &T| Ok::<R, Infallible>(read(target)))
    }

    /// Add a fallible reader: `fn name(&self) -> Result<R, E>`.
    ///
    /// Errors returned by `read` surface as [`Error::Invocation`].
    pub fn try_reader<R, E, F>(&mut self, name: &str, read: F) -> &mut Self
    where
        R: PropertyValue,
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&T) -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        let member = name.to_string();
        let direct: ReadFn = Arc::new(move |target: &dyn Any| {
            let typed = downcast_ref::<T>(target)?;
            read(typed)
                .map(PropertyValue::into_value)
                .map_err(|e| invocation_error!(member, e))
        });

        let body = direct.clone();
        let invoker = Invoker::Shared(Arc::new(move |target: &dyn Any, _args: Vec<Value>| {
            body(target)
        }));

        self.push_method(
            name,
            Vec::new(),
            R::value_type(),
            Receiver::Shared,
            invoker,
            Some(DirectAccess::Read(direct)),
        )
    }

    /// Add a writer: `fn name(&mut self, value: A)`.
    pub fn writer<A, F>(&mut self, name: &str, write: F) -> &mut Self
    where
        A: PropertyValue,
        F: Fn(&mut T, A) + Send + Sync + 'static,
    {
        self.push_writer(name, ValueType::Unit, move |target: &mut T, value: A| {
            write(target, value);
            Ok::<(), Infallible>(())
        })
    }

    /// Add a fallible writer: `fn name(&mut self, value: A) -> Result<(), E>`.
    ///
    /// Errors returned by `write` surface as [`Error::Invocation`].
    pub fn try_writer<A, E, F>(&mut self, name: &str, write: F) -> &mut Self
    where
        A: PropertyValue,
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&mut T, A) -> std::result::Result<(), E> + Send + Sync + 'static,
    {
        self.push_writer(name, ValueType::Unit, write)
    }

    /// Add a chainable writer: `fn name(&mut self, value: A) -> &mut Self`.
    pub fn fluent_writer<A, F>(&mut self, name: &str, write: F) -> &mut Self
    where
        A: PropertyValue,
        F: for<'a> Fn(&'a mut T, A) -> &'a mut T + Send + Sync + 'static,
    {
        let returns = ValueType::Object(self.key);
        self.push_writer(name, returns, move |target: &mut T, value: A| {
            write(target, value);
            Ok::<(), Infallible>(())
        })
    }

    /// Add a `&self` method with an arbitrary signature and an erased body.
    pub fn method_ref<F>(
        &mut self,
        name: &str,
        params: &[ValueType],
        returns: ValueType,
        body: F,
    ) -> &mut Self
    where
        F: Fn(&T, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        let invoker = Invoker::Shared(Arc::new(move |target: &dyn Any, args: Vec<Value>| {
            body(downcast_ref::<T>(target)?, args)
        }));
        self.push_method(
            name,
            params.to_vec(),
            returns,
            Receiver::Shared,
            invoker,
            None,
        )
    }

    /// Add a `&mut self` method with an arbitrary signature and an erased body.
    pub fn method_mut<F>(
        &mut self,
        name: &str,
        params: &[ValueType],
        returns: ValueType,
        body: F,
    ) -> &mut Self
    where
        F: Fn(&mut T, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        let invoker = Invoker::Exclusive(Arc::new(
            move |target: &mut dyn Any, args: Vec<Value>| body(downcast_mut::<T>(target)?, args),
        ));
        self.push_method(
            name,
            params.to_vec(),
            returns,
            Receiver::Exclusive,
            invoker,
            None,
        )
    }

    /// Add the diagnostic `to_string` method for types implementing [`fmt::Display`].
    pub fn display(&mut self) -> &mut Self
    where
        T: fmt::Display,
    {
        self.reader("to_string", |target: &T| target.to_string())
    }

    fn push_writer<A, E, F>(&mut self, name: &str, returns: ValueType, write: F) -> &mut Self
    where
        A: PropertyValue,
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&mut T, A) -> std::result::Result<(), E> + Send + Sync + 'static,
    {
        let member = name.to_string();
        let direct: WriteFn = Arc::new(move |target: &mut dyn Any, value: Value| {
            let typed = downcast_mut::<T>(target)?;
            let arg = A::from_value(value).map_err(|found| Error::ArgumentMismatch {
                member: member.clone(),
                expected: A::value_type(),
                found,
            })?;
            write(typed, arg).map_err(|e| invocation_error!(member, e))
        });

        let body = direct.clone();
        let invoker = Invoker::Exclusive(Arc::new(
            move |target: &mut dyn Any, args: Vec<Value>| {
                let value = args.into_iter().next().unwrap_or_default();
                body(target, value).map(|()| Value::Null)
            },
        ));

        self.push_method(
            name,
            vec![A::value_type()],
            returns,
            Receiver::Exclusive,
            invoker,
            Some(DirectAccess::Write(direct)),
        )
    }
}

fn universal_type_name(key: TypeKey) -> MethodDescriptor {
    MethodDescriptor {
        name: "type_name".to_string(),
        declaring_type: TypeKey::universal(),
        params: Vec::new(),
        returns: ValueType::String,
        receiver: Receiver::Shared,
        flags: MethodFlags::PUBLIC,
        marker: None,
        invoker: Some(Invoker::Shared(Arc::new(move |_target: &dyn Any, _args: Vec<Value>| {
            Ok(Value::String(key.name().to_string()))
        }))),
        direct: None,
    }
}

fn downcast_ref<T: Any>(target: &dyn Any) -> Result<&T> {
    match target.downcast_ref::<T>() {
        Some(typed) => Ok(typed),
        None => Err(Error::TargetMismatch {
            expected: type_name::<T>(),
            found: format!("{:?}", target.type_id()),
        }),
    }
}

fn downcast_mut<T: Any>(target: &mut dyn Any) -> Result<&mut T> {
    let found = format!("{:?}", (*target).type_id());
    target
        .downcast_mut::<T>()
        .ok_or(Error::TargetMismatch {
            expected: type_name::<T>(),
            found,
        })
}

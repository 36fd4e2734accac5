//! Callable descriptors: the introspectable surface of a function exposed as a tool.
//!
//! A [`Callable`] reports its signature as a [`CallableDescriptor`] and can be invoked
//! with [`CoercedArgs`]. [`FunctionTool`] is the closure-backed implementation used by
//! most applications.

use crate::coerce::CoercedArgs;
use crate::schema::StructuralType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Function names accepted by function-calling providers.
static FUNCTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").expect("function name pattern is valid"));

/// Errors raised while obtaining a callable's signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Failed to get signature for function {callable}: {reason}")]
    Opaque { callable: String, reason: String },

    #[error("Invalid function name '{name}': expected 1-64 characters of [a-zA-Z0-9_-]")]
    InvalidName { name: String },

    #[error("Function {callable} declares an unnamed parameter at position {position}")]
    EmptyParameterName { callable: String, position: usize },

    #[error("Function {callable} declares parameter '{parameter}' more than once")]
    DuplicateParameter { callable: String, parameter: String },
}

/// Primitive parameter types and their JSON type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    None,
}

impl PrimitiveType {
    /// JSON Schema `type` keyword for this primitive.
    pub fn json_type(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Float => "number",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Array => "array",
            PrimitiveType::Object => "object",
            PrimitiveType::None => "null",
        }
    }

    /// Map a type annotation name to a primitive, if it names one.
    pub fn from_annotation(annotation: &str) -> Option<Self> {
        let ty = match annotation.trim() {
            "string" | "str" | "String" | "&str" => PrimitiveType::String,
            "integer" | "int" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8"
            | "u16" | "u32" | "u64" | "u128" | "usize" => PrimitiveType::Integer,
            "number" | "float" | "f32" | "f64" => PrimitiveType::Float,
            "boolean" | "bool" => PrimitiveType::Boolean,
            "array" | "list" | "Vec" => PrimitiveType::Array,
            "object" | "dict" | "Map" | "HashMap" | "BTreeMap" => PrimitiveType::Object,
            "null" | "None" | "()" => PrimitiveType::None,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_type())
    }
}

/// Statically declared type of a parameter.
#[derive(Debug, Clone)]
pub enum DeclaredType {
    Primitive(PrimitiveType),
    Structural(StructuralType),
    /// An annotation that names no known type. Encoded as `"string"`.
    Unresolved(String),
}

impl DeclaredType {
    pub fn from_annotation(annotation: &str) -> Self {
        match PrimitiveType::from_annotation(annotation) {
            Some(p) => DeclaredType::Primitive(p),
            None => DeclaredType::Unresolved(annotation.to_string()),
        }
    }

    /// Whether this type can be resolved to a schema without falling back.
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, DeclaredType::Unresolved(_))
    }

    pub fn as_structural(&self) -> Option<&StructuralType> {
        match self {
            DeclaredType::Structural(s) => Some(s),
            _ => None,
        }
    }
}

impl From<PrimitiveType> for DeclaredType {
    fn from(p: PrimitiveType) -> Self {
        DeclaredType::Primitive(p)
    }
}

impl From<StructuralType> for DeclaredType {
    fn from(s: StructuralType) -> Self {
        DeclaredType::Structural(s)
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub name: String,
    pub declared: Option<DeclaredType>,
    /// Default value; a parameter is required iff this is `None`.
    pub default: Option<Value>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: None,
            default: None,
        }
    }

    pub fn typed(mut self, ty: impl Into<DeclaredType>) -> Self {
        self.declared = Some(ty.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Which schema path a callable takes. Computed once per descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaMode {
    /// No parameter carries a resolvable type: primitive type map only.
    Unstructured,
    /// At least one parameter carries a resolvable type.
    Structured,
}

impl SchemaMode {
    fn detect(params: &[ParamDescriptor]) -> Self {
        let typed = params
            .iter()
            .any(|p| p.declared.as_ref().is_some_and(DeclaredType::is_resolvable));
        if typed {
            SchemaMode::Structured
        } else {
            SchemaMode::Unstructured
        }
    }
}

/// A callable's name, docstring and ordered parameter list.
#[derive(Debug, Clone)]
pub struct CallableDescriptor {
    name: String,
    doc: Option<String>,
    params: Vec<ParamDescriptor>,
    returns: Option<DeclaredType>,
    mode: SchemaMode,
}

impl CallableDescriptor {
    pub fn builder(name: impl Into<String>) -> CallableDescriptorBuilder {
        CallableDescriptorBuilder {
            name: name.into(),
            doc: None,
            params: Vec::new(),
            returns: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamDescriptor> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Return annotation. Never part of the derived schema.
    pub fn returns(&self) -> Option<&DeclaredType> {
        self.returns.as_ref()
    }

    pub fn mode(&self) -> SchemaMode {
        self.mode
    }

    /// Names of parameters without a default, in declaration order.
    pub fn required(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.clone())
            .collect()
    }
}

pub struct CallableDescriptorBuilder {
    name: String,
    doc: Option<String>,
    params: Vec<ParamDescriptor>,
    returns: Option<DeclaredType>,
}

impl CallableDescriptorBuilder {
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Shorthand for an untyped parameter without default.
    pub fn arg(self, name: impl Into<String>) -> Self {
        self.param(ParamDescriptor::new(name))
    }

    pub fn returns(mut self, ty: impl Into<DeclaredType>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    pub fn build(self) -> Result<CallableDescriptor, SignatureError> {
        if !FUNCTION_NAME.is_match(&self.name) {
            return Err(SignatureError::InvalidName { name: self.name });
        }

        let mut seen = HashSet::new();
        for (position, p) in self.params.iter().enumerate() {
            if p.name.is_empty() {
                return Err(SignatureError::EmptyParameterName {
                    callable: self.name,
                    position,
                });
            }
            if !seen.insert(p.name.as_str()) {
                return Err(SignatureError::DuplicateParameter {
                    callable: self.name.clone(),
                    parameter: p.name.clone(),
                });
            }
        }

        let mode = SchemaMode::detect(&self.params);
        Ok(CallableDescriptor {
            name: self.name,
            doc: self.doc,
            params: self.params,
            returns: self.returns,
            mode,
        })
    }
}

/// Anything that can be exposed to the function-calling protocol.
pub trait Callable: Send + Sync {
    /// Report the callable's signature.
    ///
    /// Fails with [`SignatureError`] when the parameter list cannot be introspected.
    fn signature(&self) -> Result<CallableDescriptor, SignatureError>;

    /// Invoke with arguments already coerced against the signature.
    fn call(&self, args: &CoercedArgs) -> crate::Result<Value>;
}

type Handler = dyn Fn(&CoercedArgs) -> crate::Result<Value> + Send + Sync;

/// A callable backed by a closure and a declared signature.
pub struct FunctionTool {
    descriptor: CallableDescriptor,
    handler: Box<Handler>,
}

impl FunctionTool {
    pub fn new<F>(descriptor: CallableDescriptor, handler: F) -> Self
    where
        F: Fn(&CoercedArgs) -> crate::Result<Value> + Send + Sync + 'static,
    {
        Self {
            descriptor,
            handler: Box::new(handler),
        }
    }

    pub fn descriptor(&self) -> &CallableDescriptor {
        &self.descriptor
    }
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl Callable for FunctionTool {
    fn signature(&self) -> Result<CallableDescriptor, SignatureError> {
        Ok(self.descriptor.clone())
    }

    fn call(&self, args: &CoercedArgs) -> crate::Result<Value> {
        (self.handler)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_unstructured_without_types() {
        let d = CallableDescriptor::builder("send_email")
            .arg("recipient")
            .arg("subject")
            .arg("body")
            .build()
            .unwrap();
        assert_eq!(d.mode(), SchemaMode::Unstructured);
    }

    #[test]
    fn test_mode_ignores_unresolved_and_return_types() {
        let d = CallableDescriptor::builder("f")
            .param(ParamDescriptor::new("x").typed(DeclaredType::from_annotation("Widget")))
            .returns(PrimitiveType::String)
            .build()
            .unwrap();
        assert_eq!(d.mode(), SchemaMode::Unstructured);

        let d = CallableDescriptor::builder("g")
            .arg("a")
            .param(ParamDescriptor::new("b").typed(PrimitiveType::Integer))
            .build()
            .unwrap();
        assert_eq!(d.mode(), SchemaMode::Structured);
    }

    #[test]
    fn test_required_excludes_defaults() {
        let d = CallableDescriptor::builder("f")
            .arg("a")
            .param(ParamDescriptor::new("b").with_default("now"))
            .param(ParamDescriptor::new("c").with_default(Value::Null))
            .arg("d")
            .build()
            .unwrap();
        assert_eq!(d.required(), vec!["a".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_invalid_signatures() {
        assert!(matches!(
            CallableDescriptor::builder("bad name").build(),
            Err(SignatureError::InvalidName { .. })
        ));
        assert!(matches!(
            CallableDescriptor::builder("").build(),
            Err(SignatureError::InvalidName { .. })
        ));
        assert!(matches!(
            CallableDescriptor::builder("f").arg("x").arg("x").build(),
            Err(SignatureError::DuplicateParameter { parameter, .. }) if parameter == "x"
        ));
        assert!(matches!(
            CallableDescriptor::builder("f").arg("x").arg("").build(),
            Err(SignatureError::EmptyParameterName { position: 1, .. })
        ));
    }

    #[test]
    fn test_annotation_mapping() {
        assert_eq!(PrimitiveType::from_annotation("int"), Some(PrimitiveType::Integer));
        assert_eq!(PrimitiveType::from_annotation("f64"), Some(PrimitiveType::Float));
        assert_eq!(PrimitiveType::from_annotation("dict"), Some(PrimitiveType::Object));
        assert_eq!(PrimitiveType::from_annotation("None"), Some(PrimitiveType::None));
        assert_eq!(PrimitiveType::from_annotation("Decimal"), None);
        assert_eq!(PrimitiveType::Float.to_string(), "number");
    }
}

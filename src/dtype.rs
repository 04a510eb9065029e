/// Element type of a tensor's contents.
///
/// Only scalar element types appear here; pointer and vector types belong to
/// later lowering stages, not to the graph-construction model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F64,
    I32,
    I64,
    Bool,
}

impl Default for DType {
    /// Tensors are 32-bit float unless stated otherwise.
    fn default() -> Self {
        DType::F32
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::Bool => "bool",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_f32() {
        assert_eq!(DType::default(), DType::F32);
    }

    #[test]
    fn test_display() {
        assert_eq!(DType::F64.to_string(), "f64");
        assert_eq!(DType::Bool.to_string(), "bool");
    }
}

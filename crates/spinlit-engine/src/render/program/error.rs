use std::fmt;

/// Upper bound for compiler/linker diagnostics surfaced to the operator.
pub const MAX_DIAGNOSTIC_LEN: usize = 512;

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub(crate) fn visibility(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failure while building a shader program.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// A stage failed to parse or validate.
    Compile { stage: ShaderStage, diagnostic: String },

    /// The stages compiled but do not form a usable program.
    Link { diagnostic: String },

    /// A uniform path does not name anything the program declares.
    MissingUniform { name: String },
}

impl ShaderError {
    pub(crate) fn compile(stage: ShaderStage, diagnostic: impl Into<String>) -> Self {
        Self::Compile {
            stage,
            diagnostic: truncate_diagnostic(diagnostic.into()),
        }
    }

    pub(crate) fn link(diagnostic: impl Into<String>) -> Self {
        Self::Link {
            diagnostic: truncate_diagnostic(diagnostic.into()),
        }
    }

    pub(crate) fn missing_uniform(name: &str) -> Self {
        Self::MissingUniform { name: name.to_string() }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Compile { stage, diagnostic } => {
                write!(f, "{stage} shader compilation failed:\n{diagnostic}")
            }
            ShaderError::Link { diagnostic } => {
                write!(f, "shader program linking failed:\n{diagnostic}")
            }
            ShaderError::MissingUniform { name } => {
                write!(f, "uniform `{name}` is not declared by the shader program")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// Cuts `diagnostic` to at most `MAX_DIAGNOSTIC_LEN` bytes on a char boundary.
pub(crate) fn truncate_diagnostic(mut diagnostic: String) -> String {
    if diagnostic.len() > MAX_DIAGNOSTIC_LEN {
        let mut end = MAX_DIAGNOSTIC_LEN;
        while !diagnostic.is_char_boundary(end) {
            end -= 1;
        }
        diagnostic.truncate(end);
    }
    diagnostic
}

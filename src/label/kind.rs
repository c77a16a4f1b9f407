//! Rule kinds recognized by the classpath resolver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The Bazel rule kind of a target.
///
/// Rules the resolver does not know about are kept as [`TargetKind::Unknown`]
/// with their original name; they are treated as plain jar producers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetKind {
    /// `java_library`
    JavaLibrary,
    /// `java_binary`
    JavaBinary,
    /// `java_test`
    JavaTest,
    /// `java_import`
    JavaImport,
    /// `java_web_test_suite`
    JavaWebTestSuite,
    /// `springboot`
    SpringBoot,
    /// `java_proto_library`
    JavaProtoLibrary,
    /// `java_lite_proto_library`
    JavaLiteProtoLibrary,
    /// `java_grpc_library`
    JavaGrpcLibrary,
    /// Any other rule kind.
    Unknown(String),
}

impl TargetKind {
    /// Parse a rule kind, ignoring case.
    pub fn parse(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "java_library" => Self::JavaLibrary,
            "java_binary" => Self::JavaBinary,
            "java_test" => Self::JavaTest,
            "java_import" => Self::JavaImport,
            "java_web_test_suite" => Self::JavaWebTestSuite,
            "springboot" => Self::SpringBoot,
            "java_proto_library" => Self::JavaProtoLibrary,
            "java_lite_proto_library" => Self::JavaLiteProtoLibrary,
            "java_grpc_library" => Self::JavaGrpcLibrary,
            _ => Self::Unknown(kind.to_string()),
        }
    }

    /// The rule name as Bazel spells it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::JavaLibrary => "java_library",
            Self::JavaBinary => "java_binary",
            Self::JavaTest => "java_test",
            Self::JavaImport => "java_import",
            Self::JavaWebTestSuite => "java_web_test_suite",
            Self::SpringBoot => "springboot",
            Self::JavaProtoLibrary => "java_proto_library",
            Self::JavaLiteProtoLibrary => "java_lite_proto_library",
            Self::JavaGrpcLibrary => "java_grpc_library",
            Self::Unknown(name) => name,
        }
    }

    /// Targets that can be launched with `bazel run`.
    pub const fn is_runnable(&self) -> bool {
        matches!(self, Self::JavaBinary | Self::SpringBoot)
    }

    /// Targets that can be launched with `bazel test`.
    pub const fn is_testable(&self) -> bool {
        matches!(self, Self::JavaTest | Self::JavaWebTestSuite)
    }

    /// Targets represented in the IDE by their sources rather than their output jar.
    pub const fn is_library_like(&self) -> bool {
        matches!(self, Self::JavaLibrary | Self::JavaBinary)
    }

    /// Targets that wrap prebuilt jars.
    pub const fn is_import(&self) -> bool {
        matches!(self, Self::JavaImport)
    }
}

impl Default for TargetKind {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl FromStr for TargetKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for TargetKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<TargetKind> for String {
    fn from(value: TargetKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

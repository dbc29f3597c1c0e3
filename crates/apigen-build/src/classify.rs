//! Operation kind classification from path shape and HTTP method.
//!
//! | Path                  | `get`           | `post`   | `put`        | `delete`     |
//! |-----------------------|-----------------|----------|--------------|--------------|
//! | ends with `}`         | `show`          | skip     | `update`     | `delete`     |
//! | ends with `/detail`   | `list_detailed` | skip     | skip         | skip         |
//! | ends with `/action`   | skip            | `action` | skip         | skip         |
//! | has child `<path>/{`  | `list`          | `create` | `replace`    | `delete_all` |
//! | otherwise             | `get`           | `create` | last segment | `delete`     |
//!
//! `patch` is `update` on any path. `head`, `options` and `trace` are skipped.

use std::fmt;

use apigen_core::spec::{has_child_item, MEDIA_OCTET_STREAM};
use apigen_core::{Method, Operation, OperationKind, OperationRef, Spec};

use crate::naming;

/// Outcome of classifying one `(path, method)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The operation has this kind.
    Kind(OperationKind),
    /// The operation is deliberately not generated.
    Skip(SkipReason),
}

/// Why an operation was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The method carries no generator semantics (`head`, `options`, `trace`).
    Method(Method),
    /// The method is not meaningful on this path shape (e.g. `post` on an item).
    PathShape {
        /// Path template.
        path: String,
        /// HTTP method.
        method: Method,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(method) => write!(f, "method '{method}' is not classified"),
            Self::PathShape { path, method } => {
                write!(f, "no operation kind for '{method}' on '{path}'")
            }
        }
    }
}

impl Classification {
    /// The kind, if not skipped.
    #[must_use]
    pub fn kind(&self) -> Option<&OperationKind> {
        match self {
            Self::Kind(kind) => Some(kind),
            Self::Skip(_) => None,
        }
    }
}

/// Classify `(path, method)` given whether `path` has a child item path.
#[must_use]
pub fn classify(path: &str, method: Method, has_child: bool) -> Classification {
    let path = path.trim_end_matches('/');
    let skip = || {
        Classification::Skip(SkipReason::PathShape {
            path: path.to_string(),
            method,
        })
    };
    let kind = |kind: OperationKind| Classification::Kind(kind);

    match method {
        Method::Head | Method::Options | Method::Trace => {
            return Classification::Skip(SkipReason::Method(method));
        }
        Method::Patch => return kind(OperationKind::Update),
        Method::Get | Method::Post | Method::Put | Method::Delete => {}
    }

    if path.ends_with('}') {
        return match method {
            Method::Get => kind(OperationKind::Show),
            Method::Put => kind(OperationKind::Update),
            Method::Delete => kind(OperationKind::Delete),
            _ => skip(),
        };
    }
    if path.ends_with("/detail") {
        return match method {
            Method::Get => kind(OperationKind::ListDetailed),
            _ => skip(),
        };
    }
    if path.ends_with("/action") {
        return match method {
            Method::Post => kind(OperationKind::Action),
            _ => skip(),
        };
    }
    if has_child {
        return match method {
            Method::Get => kind(OperationKind::List),
            Method::Post => kind(OperationKind::Create),
            Method::Put => kind(OperationKind::Replace),
            Method::Delete => kind(OperationKind::DeleteAll),
            _ => skip(),
        };
    }
    match method {
        Method::Get => kind(OperationKind::Get),
        Method::Post => kind(OperationKind::Create),
        Method::Delete => kind(OperationKind::Delete),
        Method::Put => match path.rsplit('/').next().filter(|s| !s.is_empty()) {
            Some(last) => kind(OperationKind::from(naming::module_name(last))),
            None => skip(),
        },
        _ => skip(),
    }
}

/// Turn plain reads and writes of binary payloads into `download`/`upload`.
#[must_use]
pub fn refine(kind: OperationKind, operation: &Operation) -> OperationKind {
    match kind {
        OperationKind::Get | OperationKind::Show if is_binary_download(operation) => {
            OperationKind::Download
        }
        OperationKind::Replace | OperationKind::Update | OperationKind::Other(_)
            if is_binary_upload(operation) =>
        {
            OperationKind::Upload
        }
        other => other,
    }
}

/// Classify an operation of `spec`, refinement included.
#[must_use]
pub fn classify_operation(spec: &Spec, op: &OperationRef<'_>) -> Classification {
    let has_child = has_child_item(spec.paths.keys().map(String::as_str), op.path);
    match classify(op.path, op.method, has_child) {
        Classification::Kind(kind) => Classification::Kind(
            if op.method == Method::Put || op.method == Method::Get {
                refine(kind, op.operation)
            } else {
                kind
            },
        ),
        skip @ Classification::Skip(_) => skip,
    }
}

fn is_binary_download(operation: &Operation) -> bool {
    operation
        .success_response()
        .is_some_and(|(_, response)| {
            !response.content.is_empty()
                && response.content.keys().all(|media| media == MEDIA_OCTET_STREAM)
        })
}

fn is_binary_upload(operation: &Operation) -> bool {
    operation
        .request_content()
        .is_some_and(|content| content.contains_key(MEDIA_OCTET_STREAM))
}

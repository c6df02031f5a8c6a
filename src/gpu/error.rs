use eframe::glow::{self, HasContext as _};
use log::error;
use std::panic::Location;
use thiserror::Error;

/// Failures while creating GPU resources. Any of these aborts start-up.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("failed to create {what}: {reason}")]
    Create { what: &'static str, reason: String },

    #[error("{stage} shader of '{program}' failed to compile: {log}")]
    Compile {
        program: &'static str,
        stage: &'static str,
        log: String,
    },

    #[error("program '{program}' failed to link: {log}")]
    Link { program: &'static str, log: String },

    #[error("shadow framebuffer incomplete (status 0x{status:04X})")]
    IncompleteFramebuffer { status: u32 },

    #[error("{what} of {value} does not fit a GL size")]
    SizeOverflow { what: &'static str, value: usize },
}

impl GpuError {
    pub(crate) fn create(what: &'static str) -> impl FnOnce(String) -> Self {
        move |reason| Self::Create { what, reason }
    }
}

/// Converts a count or size to the `i32` GL expects.
pub(crate) fn gl_size(what: &'static str, value: usize) -> Result<i32, GpuError> {
    i32::try_from(value).map_err(|_| GpuError::SizeOverflow { what, value })
}

pub fn gl_error_name(code: u32) -> &'static str {
    match code {
        glow::INVALID_ENUM => "INVALID_ENUM",
        glow::INVALID_VALUE => "INVALID_VALUE",
        glow::INVALID_OPERATION => "INVALID_OPERATION",
        glow::STACK_OVERFLOW => "STACK_OVERFLOW",
        glow::STACK_UNDERFLOW => "STACK_UNDERFLOW",
        glow::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        glow::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
        glow::CONTEXT_LOST => "CONTEXT_LOST",
        _ => "UNKNOWN_ERROR",
    }
}

/// Drains pending GL errors and logs each one with the caller's location.
/// Returns how many were found. Never aborts.
#[track_caller]
pub fn check_gl_error(gl: &glow::Context, stage: &str) -> usize {
    // A lost context can report errors forever.
    const MAX_DRAIN: usize = 16;

    let caller = Location::caller();
    let mut count = 0;
    while count < MAX_DRAIN {
        let code = unsafe { gl.get_error() };
        if code == glow::NO_ERROR {
            break;
        }
        error!(
            "GL error {} (0x{:04X}) during {} at {}:{}",
            gl_error_name(code),
            code,
            stage,
            caller.file(),
            caller.line()
        );
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_have_names() {
        assert_eq!(gl_error_name(0x0500), "INVALID_ENUM");
        assert_eq!(gl_error_name(0x0502), "INVALID_OPERATION");
        assert_eq!(gl_error_name(0x0506), "INVALID_FRAMEBUFFER_OPERATION");
        assert_eq!(gl_error_name(0x1234), "UNKNOWN_ERROR");
    }

    #[test]
    fn sizes_beyond_i32_are_rejected() {
        assert_eq!(gl_size("count", 36).unwrap(), 36);
        let err = gl_size("count", usize::MAX).unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }
}

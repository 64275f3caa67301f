use crate::buffer::CcmBuffer;
use crate::error::CcmError;

/// A structure that can be read from the current position of a [`CcmBuffer`],
/// honoring whatever byte order the buffer is set to.
pub trait Parse: Sized {
    fn parse(input: &mut CcmBuffer<'_>) -> Result<Self, CcmError>;
}

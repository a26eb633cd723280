//! Marker types.

/// Marker type describing a reservation confirmation.
#[derive(Clone, Copy, Debug)]
pub struct Confirmation;

/// Marker type describing a submission of a form.
#[derive(Clone, Copy, Debug)]
pub struct Submission;

/// Marker type describing a response to a request.
#[derive(Clone, Copy, Debug)]
pub struct Response;

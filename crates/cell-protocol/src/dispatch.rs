//! Fragment dispatch for one outstanding command
//!
//! The transport calls [`Session::dispatch`] once per reply fragment, serially,
//! while the command is in flight. The session owns the decoder for that
//! command; once the transport reports completion the caller reads the
//! decoder back out.

use crate::decoder::{Decoder, ResponseDecoder};
use crate::fragment::{CompletionStatus, Continuation, FragmentKind};

/// Routes reply fragments to the active decoder
#[derive(Debug, Clone)]
pub struct Session {
    decoder: Decoder,
    fragments_seen: usize,
}

impl Session {
    /// Start a session around `decoder`
    pub fn new(decoder: impl Into<Decoder>) -> Self {
        Self {
            decoder: decoder.into(),
            fragments_seen: 0,
        }
    }

    /// Forward one fragment to the decoder
    pub fn dispatch(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation {
        self.fragments_seen += 1;
        self.decoder.parse(kind, bytes)
    }

    /// Completion state of the active decoder
    pub fn status(&self) -> CompletionStatus {
        self.decoder.status()
    }

    /// The active decoder
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// The active decoder, mutably
    pub fn decoder_mut(&mut self) -> &mut Decoder {
        &mut self.decoder
    }

    /// End the session and take the decoder
    pub fn into_decoder(self) -> Decoder {
        self.decoder
    }

    /// Swap in the decoder for the next command, returning the previous one
    pub fn replace(&mut self, decoder: impl Into<Decoder>) -> Decoder {
        self.fragments_seen = 0;
        std::mem::replace(&mut self.decoder, decoder.into())
    }

    /// Fragments dispatched since the session started or was last reused
    pub fn fragments_seen(&self) -> usize {
        self.fragments_seen
    }
}

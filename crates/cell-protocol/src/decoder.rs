//! Response decoder contract
//!
//! Every supported reply grammar has its own decoder type. They share the
//! [`ResponseDecoder`] trait so a transport binding can drive any of them, and
//! the [`Decoder`] enum wraps them so one value can be chosen when the command
//! is issued and handed to a [`Session`](crate::Session).

use crate::environment::EnvironmentDecoder;
use crate::fragment::{CompletionStatus, Continuation, FragmentKind};
use crate::location::LocationDecoder;
use crate::operator::OperatorNameDecoder;
use crate::registration::RegistrationDecoder;
use crate::signal::{ExtendedSignalQualityDecoder, SignalQualityDecoder};
use crate::text::{PlainDecoder, TaggedDecoder};

/// Sink for the fragments of one command's reply
pub trait ResponseDecoder {
    /// Consume one fragment
    fn parse(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation;

    /// Completion state recorded so far
    fn status(&self) -> CompletionStatus;

    /// Enable logging of every fragment at debug level
    fn set_debug(&mut self, enabled: bool);
}

/// Status implied by a terminal fragment, `None` for anything else
pub(crate) fn terminal_status(kind: FragmentKind) -> Option<CompletionStatus> {
    if kind == FragmentKind::Ok {
        Some(CompletionStatus::Ok)
    } else if kind.is_failure() {
        Some(CompletionStatus::Error)
    } else {
        None
    }
}

/// Log a fragment the way it arrived, one event per reply line
pub(crate) fn log_fragment(kind: FragmentKind, bytes: &[u8]) {
    tracing::debug!("cellular response type={} len={}", kind.name(), bytes.len());
    for line in crate::buffer::escape_lines(bytes) {
        tracing::debug!("{}", line);
    }
}

/// One decoder per reply grammar
#[derive(Debug, Clone)]
pub enum Decoder {
    /// Untagged text, e.g. `AT+CGMI`
    Plain(PlainDecoder),
    /// `+TAG: payload` text, e.g. `AT+CCID`
    Tagged(TaggedDecoder),
    /// Cell environment, `AT+CGED` / `AT+COPS=5`
    Environment(EnvironmentDecoder),
    /// Cell locate, `AT+ULOC`
    Location(LocationDecoder),
    /// Network registration, `AT+CREG?`
    Registration(RegistrationDecoder),
    /// Signal quality, `AT+CSQ`
    SignalQuality(SignalQualityDecoder),
    /// Extended signal quality, `AT+CESQ`
    ExtendedSignalQuality(ExtendedSignalQualityDecoder),
    /// Operator name list, `AT+COPN`
    OperatorNames(OperatorNameDecoder),
}

impl Decoder {
    fn inner(&self) -> &dyn ResponseDecoder {
        match self {
            Decoder::Plain(d) => d,
            Decoder::Tagged(d) => d,
            Decoder::Environment(d) => d,
            Decoder::Location(d) => d,
            Decoder::Registration(d) => d,
            Decoder::SignalQuality(d) => d,
            Decoder::ExtendedSignalQuality(d) => d,
            Decoder::OperatorNames(d) => d,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ResponseDecoder {
        match self {
            Decoder::Plain(d) => d,
            Decoder::Tagged(d) => d,
            Decoder::Environment(d) => d,
            Decoder::Location(d) => d,
            Decoder::Registration(d) => d,
            Decoder::SignalQuality(d) => d,
            Decoder::ExtendedSignalQuality(d) => d,
            Decoder::OperatorNames(d) => d,
        }
    }

    /// Returns a short name for the grammar
    pub fn name(&self) -> &'static str {
        match self {
            Decoder::Plain(_) => "plain",
            Decoder::Tagged(_) => "tagged",
            Decoder::Environment(_) => "environment",
            Decoder::Location(_) => "location",
            Decoder::Registration(_) => "registration",
            Decoder::SignalQuality(_) => "signal quality",
            Decoder::ExtendedSignalQuality(_) => "extended signal quality",
            Decoder::OperatorNames(_) => "operator names",
        }
    }
}

impl ResponseDecoder for Decoder {
    fn parse(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation {
        self.inner_mut().parse(kind, bytes)
    }

    fn status(&self) -> CompletionStatus {
        self.inner().status()
    }

    fn set_debug(&mut self, enabled: bool) {
        self.inner_mut().set_debug(enabled);
    }
}

/// Implements `From<$inner> for Decoder` for each variant
macro_rules! impl_from_decoder {
    ($($variant:ident($inner:ty)),* $(,)?) => {
        $(
            impl From<$inner> for Decoder {
                fn from(decoder: $inner) -> Self {
                    Decoder::$variant(decoder)
                }
            }
        )*
    };
}

impl_from_decoder!(
    Plain(PlainDecoder),
    Tagged(TaggedDecoder),
    Environment(EnvironmentDecoder),
    Location(LocationDecoder),
    Registration(RegistrationDecoder),
    SignalQuality(SignalQualityDecoder),
    ExtendedSignalQuality(ExtendedSignalQualityDecoder),
    OperatorNames(OperatorNameDecoder),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_status() {
        assert_eq!(terminal_status(FragmentKind::Ok), Some(CompletionStatus::Ok));
        assert_eq!(
            terminal_status(FragmentKind::Aborted),
            Some(CompletionStatus::Error)
        );
        assert_eq!(
            terminal_status(FragmentKind::NoCarrier),
            Some(CompletionStatus::Error)
        );
        assert_eq!(terminal_status(FragmentKind::Tagged), None);
        assert_eq!(terminal_status(FragmentKind::Unknown), None);
    }

    #[test]
    fn test_enum_delegates_to_variant() {
        let mut decoder = Decoder::from(PlainDecoder::new());
        assert_eq!(decoder.name(), "plain");
        assert_eq!(decoder.status(), CompletionStatus::Pending);

        decoder.parse(FragmentKind::Unlabeled, b"\r\nSARA-U260\r\n");
        decoder.parse(FragmentKind::Ok, b"\r\nOK\r\n");
        assert_eq!(decoder.status(), CompletionStatus::Ok);

        let Decoder::Plain(plain) = decoder else {
            panic!("expected plain decoder");
        };
        assert_eq!(plain.text(), "SARA-U260");
    }
}

use super::kerberos_time::KerberosTime;
use super::microseconds::Microseconds;
use der::Sequence;

/// ```text
/// PA-ENC-TS-ENC           ::= SEQUENCE {
///           patimestamp     [0] KerberosTime -- client's time --,
///           pausec          [1] Microseconds OPTIONAL
/// }
/// ````
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct PaEncTsEnc {
    #[asn1(context_specific = "0")]
    pub patimestamp: KerberosTime,
    #[asn1(context_specific = "1", optional = "true")]
    pub pausec: Option<Microseconds>,
}

#[cfg(test)]
mod tests {
    use super::PaEncTsEnc;
    use der::{DateTime, Decode};

    #[test]
    fn pa_enc_ts_enc_parse() {
        // 20240612114807Z, 751259us
        let blob = "301aa011180f32303234303631323131343830375aa10502030b769b";
        let blob = hex::decode(blob).expect("Failed to decode sample");
        let ts = PaEncTsEnc::from_der(&blob).expect("Failed to decode");
        assert_eq!(
            ts.patimestamp.to_date_time(),
            DateTime::new(2024, 6, 12, 11, 48, 7).expect("Failed to build datetime")
        );
        assert_eq!(ts.pausec, Some(751259));
    }
}

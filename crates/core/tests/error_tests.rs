// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use coinfolio_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid file format: bad header");
    }

    #[test]
    fn unsupported_version() {
        let err = CoreError::UnsupportedVersion(99);
        assert_eq!(err.to_string(), "Unsupported file version: 99");
    }

    #[test]
    fn store_unavailable() {
        let err = CoreError::StoreUnavailable("disk gone".into());
        assert_eq!(err.to_string(), "Local store unavailable: disk gone");
    }

    #[test]
    fn store_closed() {
        assert_eq!(CoreError::StoreClosed.to_string(), "Store handle is closed");
    }

    #[test]
    fn upstream_includes_status() {
        let err = CoreError::Upstream {
            status: 503,
            message: "request for /coins/markets failed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Upstream API unavailable (HTTP 503): request for /coins/markets failed"
        );
    }

    #[test]
    fn api_includes_provider() {
        let err = CoreError::Api {
            provider: "CoinGecko".into(),
            message: "bad json".into(),
        };
        assert_eq!(err.to_string(), "API error (CoinGecko): bad json");
    }

    #[test]
    fn coin_not_found() {
        let err = CoreError::CoinNotFound("not-a-coin".into());
        assert_eq!(err.to_string(), "Coin not found: not-a-coin");
    }

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("Portfolio name is required".into());
        assert_eq!(err.to_string(), "Validation failed: Portfolio name is required");
    }

    #[test]
    fn portfolio_not_found() {
        assert_eq!(
            CoreError::PortfolioNotFound(7).to_string(),
            "Portfolio not found: 7"
        );
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn upstream_family_is_unavailable() {
        assert!(CoreError::Upstream {
            status: 500,
            message: String::new()
        }
        .is_upstream_unavailable());
        assert!(CoreError::Network("timeout".into()).is_upstream_unavailable());
        assert!(CoreError::Api {
            provider: "CoinGecko".into(),
            message: "parse".into()
        }
        .is_upstream_unavailable());
    }

    #[test]
    fn local_errors_are_not_upstream() {
        assert!(!CoreError::CoinNotFound("x".into()).is_upstream_unavailable());
        assert!(!CoreError::StoreUnavailable("x".into()).is_upstream_unavailable());
        assert!(!CoreError::ValidationError("x".into()).is_upstream_unavailable());
        assert!(!CoreError::PortfolioNotFound(1).is_upstream_unavailable());
    }
}

// ── From conversions ────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io.into();
        match err {
            CoreError::FileIO(msg) => assert!(msg.contains("denied")),
            other => panic!("expected FileIO, got {other:?}"),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_bincode_error() {
        let bin_err = bincode::deserialize::<String>(&[0xff]).unwrap_err();
        let err: CoreError = bin_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn question_mark_propagates() {
        fn inner() -> Result<(), CoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))?;
            Ok(())
        }
        assert!(matches!(inner(), Err(CoreError::FileIO(_))));
    }
}

//! HTTP client for the analysis backend.
//!
//! Blocking `reqwest` with retries (exponential backoff on connect errors,
//! timeouts and 5xx) behind a shared circuit breaker.

use std::sync::Arc;
use std::time::Duration;

use super::circuit_breaker::CircuitBreaker;
use super::{
    parse_analysis, parse_breakdown, parse_risk, parse_strategy_code, parse_trade_history,
    AnalysisSource, AnalyzerError,
};
use crate::config::ApiConfig;
use crate::domain::{
    AnalysisResult, Breakdown, HistoryQuery, RiskAnalysis, StrategyCode, TradeHistory,
};

#[derive(Clone)]
pub struct HttpAnalyzer {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpAnalyzer {
    pub fn new(config: &ApiConfig, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, AnalyzerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("tradelens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalyzerError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            circuit_breaker,
            max_retries: config.max_retries,
            base_delay: config.base_delay(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET with retry and circuit breaker logic; returns the response body.
    fn get_with_retry(&self, path: &str, query: &[(&str, &str)]) -> Result<String, AnalyzerError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(AnalyzerError::CircuitBreakerTripped);
        }

        let url = self.endpoint(path);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(%url, attempt, delay_ms = delay.as_millis() as u64, "retrying backend request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(AnalyzerError::CircuitBreakerTripped);
            }

            match self.client.get(&url).query(query).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_server_error() {
                        self.circuit_breaker.record_failure();
                        tracing::warn!(%url, status = status.as_u16(), "backend server error");
                        last_error = Some(AnalyzerError::Http {
                            status: status.as_u16(),
                            url: url.clone(),
                        });
                        continue;
                    }

                    if !status.is_success() {
                        return Err(AnalyzerError::Http {
                            status: status.as_u16(),
                            url,
                        });
                    }

                    let body = resp
                        .text()
                        .map_err(|e| AnalyzerError::MalformedResponse(e.to_string()))?;
                    self.circuit_breaker.record_success();
                    return Ok(body);
                }
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    if e.is_connect() || e.is_timeout() {
                        tracing::warn!(%url, error = %e, "backend unreachable");
                        last_error = Some(AnalyzerError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(AnalyzerError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AnalyzerError::NetworkUnreachable("max retries exceeded".into())))
    }
}

impl AnalysisSource for HttpAnalyzer {
    fn name(&self) -> &str {
        "http_backend"
    }

    fn fetch_analysis(&self) -> Result<AnalysisResult, AnalyzerError> {
        let body = self.get_with_retry("analyze", &[])?;
        let result = parse_analysis(&body)?;
        tracing::info!(
            trades = result.trades.len(),
            strategy = %result.summary.strategy,
            "analysis received"
        );
        Ok(result)
    }

    fn fetch_strategy_code(&self, strategy: &str) -> Result<StrategyCode, AnalyzerError> {
        let body = self.get_with_retry("strategy/template", &[("strategy", strategy)])?;
        parse_strategy_code(&body)
    }

    fn fetch_risk(&self) -> Result<RiskAnalysis, AnalyzerError> {
        parse_risk(&self.get_with_retry("analyze/risk", &[])?)
    }

    fn fetch_sessions(&self) -> Result<Breakdown, AnalyzerError> {
        parse_breakdown(&self.get_with_retry("analyze/sessions", &[])?, "session")
    }

    fn fetch_symbols(&self) -> Result<Breakdown, AnalyzerError> {
        let body = self.get_with_retry("analyze/symbols", &[])?;
        Ok(parse_breakdown(&body, "symbol")?.sorted_by_profit())
    }

    fn fetch_trade_history(&self, query: HistoryQuery) -> Result<TradeHistory, AnalyzerError> {
        let limit = query.limit.to_string();
        let days_back = query.days_back.to_string();
        let body = self.get_with_retry(
            "trades/history",
            &[("limit", limit.as_str()), ("days_back", days_back.as_str())],
        )?;
        let history = parse_trade_history(&body)?;
        tracing::info!(trades = history.trades.len(), days_back = query.days_back, "trade history received");
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Mutex;
    use std::thread::{self, JoinHandle};
    use std::time::Instant;

    fn analyzer(base: &str) -> HttpAnalyzer {
        let config = ApiConfig {
            base_url: base.into(),
            ..ApiConfig::default()
        };
        HttpAnalyzer::new(&config, Arc::new(CircuitBreaker::default_backend())).unwrap()
    }

    /// Local server answering one scripted response per connection.
    struct Stub {
        base_url: String,
        requests: Arc<Mutex<Vec<String>>>,
        handle: JoinHandle<()>,
    }

    fn stub(script: Vec<(u16, &'static str)>) -> Stub {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let handle = thread::spawn(move || {
            for (status, body) in script {
                let Ok((mut stream, _)) = listener.accept() else { return };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let text = String::from_utf8_lossy(&request);
                seen.lock().unwrap().push(text.lines().next().unwrap_or_default().to_string());

                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    _ => "Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Stub {
            base_url,
            requests,
            handle,
        }
    }

    fn stub_analyzer(stub: &Stub, max_retries: u32, base_delay_ms: u64, breaker: CircuitBreaker) -> HttpAnalyzer {
        let config = ApiConfig {
            base_url: stub.base_url.clone(),
            timeout_secs: 5,
            max_retries,
            base_delay_ms,
        };
        let mut analyzer = HttpAnalyzer::new(&config, Arc::new(breaker)).unwrap();
        // Ignore any proxy from the environment; the stub is local.
        analyzer.client = reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(config.timeout())
            .build()
            .unwrap();
        analyzer
    }

    const ANALYZE_OK: &str = r#"{"summary": {"strategy": "Scalping"}, "trades": []}"#;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let a = analyzer("http://localhost:8000/");
        assert_eq!(a.base_url(), "http://localhost:8000");
        assert_eq!(a.endpoint("analyze"), "http://localhost:8000/analyze");
        assert_eq!(a.endpoint("/strategy/template"), "http://localhost:8000/strategy/template");
    }

    #[test]
    fn open_breaker_short_circuits() {
        let config = ApiConfig::default();
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(600), 1));
        breaker.record_failure();
        let a = HttpAnalyzer::new(&config, breaker).unwrap();
        assert!(matches!(a.fetch_analysis(), Err(AnalyzerError::CircuitBreakerTripped)));
    }

    #[test]
    fn server_error_is_retried() {
        let server = stub(vec![(500, "{}"), (200, ANALYZE_OK)]);
        let a = stub_analyzer(&server, 2, 1, CircuitBreaker::default_backend());

        let result = a.fetch_analysis().unwrap();
        assert_eq!(result.summary.strategy, "Scalping");
        server.handle.join().unwrap();
        assert_eq!(server.requests.lock().unwrap().len(), 2);
    }

    #[test]
    fn retries_back_off_exponentially() {
        let server = stub(vec![(500, "{}"), (500, "{}"), (200, ANALYZE_OK)]);
        let a = stub_analyzer(&server, 3, 20, CircuitBreaker::default_backend());

        let start = Instant::now();
        a.fetch_analysis().unwrap();
        // 20ms before the second attempt, 40ms before the third.
        assert!(start.elapsed() >= Duration::from_millis(60));
        server.handle.join().unwrap();
    }

    #[test]
    fn client_error_is_not_retried() {
        let server = stub(vec![(404, "{}")]);
        let a = stub_analyzer(&server, 3, 1, CircuitBreaker::default_backend());

        let err = a.fetch_analysis().unwrap_err();
        assert!(matches!(err, AnalyzerError::Http { status: 404, .. }));
        server.handle.join().unwrap();
        assert_eq!(server.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn breaker_trips_between_retries() {
        let server = stub(vec![(500, "{}"), (500, "{}")]);
        let breaker = CircuitBreaker::new(Duration::from_secs(600), 2);
        let a = stub_analyzer(&server, 5, 1, breaker);

        let err = a.fetch_analysis().unwrap_err();
        assert!(matches!(err, AnalyzerError::CircuitBreakerTripped));
        server.handle.join().unwrap();
        assert_eq!(server.requests.lock().unwrap().len(), 2);
    }

    #[test]
    fn history_sends_query_parameters() {
        let server = stub(vec![(200, r#"{"trades": [], "total": 0}"#)]);
        let a = stub_analyzer(&server, 0, 1, CircuitBreaker::default_backend());

        let history = a
            .fetch_trade_history(HistoryQuery {
                limit: 5,
                days_back: 7,
            })
            .unwrap();
        assert_eq!(history.total, 0);
        server.handle.join().unwrap();
        let requests = server.requests.lock().unwrap();
        assert!(requests[0].starts_with("GET /trades/history?limit=5&days_back=7 "));
    }
}

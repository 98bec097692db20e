pub mod mock_broker;
pub mod mock_candle_source;
pub mod mock_order_flow;

pub use mock_broker::MockBroker;
pub use mock_candle_source::MockCandleSource;
pub use mock_order_flow::MockOrderFlow;

mod ledger;

pub use ledger::{CustodyLedger, Receipt, ReceiptSink};

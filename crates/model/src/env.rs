/// Environment variable containing the DynamoDB table holding the mailbox record
pub const DDB_TABLE_NAME: &'static str = "DDB_TABLE_NAME";
/// Environment variable containing the SNS topic ARN alerts are published to
pub const SNS_ARN: &'static str = "SNS_ARN";
/// Environment variable containing the staleness threshold in whole hours
pub const THRESHOLD_HOURS: &'static str = "THRESHOLD_HOURS";

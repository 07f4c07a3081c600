use crate::Listing;

/*
{
    "total": 250,
    "lots": [
        {
            "itemId": "y1q9",
            "amount": 1,
            "startPrice": 1500,
            "currentPrice": 1500,
            "buyoutPrice": 2000,
            "startTime": "2024-05-01T12:00:00Z",
            "endTime": "2024-05-03T12:00:00Z",
            "additional": {}
        }
    ]
}
*/
#[derive(Debug, PartialEq, serde::Deserialize)]
pub struct LotsPage {
    pub lots: Vec<Listing>,
    #[serde(default)]
    pub total: Option<u64>,
}

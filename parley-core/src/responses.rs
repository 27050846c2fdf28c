//! Canned responses for the bank agent, keyed by keyword.

/// Keyword → response, in match priority order.
pub const RESPONSES: &[(&str, &str)] = &[
    ("balance", "Your current balance is $500."),
    ("deposit", "Please enter your deposit amount."),
    (
        "transfer",
        "Please enter the account number of where you wish to transfer the funds.",
    ),
    ("withdraw", "Please enter the amount you wish to withdraw."),
    (
        "help",
        "Please choose what you'd like to do: balance, deposit, transfer, or withdraw.",
    ),
];

pub const NOT_UNDERSTOOD: &str = "I didn't understand your request. Please try again.";

/// Pick the response for the first keyword contained in `normalized_text`.
pub fn select_response(normalized_text: &str) -> &'static str {
    let lowered = normalized_text.to_lowercase();
    RESPONSES
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, response)| *response)
        .unwrap_or(NOT_UNDERSTOOD)
}

//! Configured Greenhouse boards. The name must match the companies table
//! exactly; the token is the board slug from boards.greenhouse.io/<token>.

pub struct BoardSpec {
    pub name: &'static str,
    pub token: &'static str,
}

pub const GREENHOUSE_BOARDS: &[BoardSpec] = &[
    // Confirmed working — sorted by job count
    BoardSpec { name: "Jane Street", token: "janestreet" },
    BoardSpec { name: "Qube Research & Technologies", token: "quberesearchandtechnologies" },
    BoardSpec { name: "Point72", token: "point72" },
    BoardSpec { name: "Squarepoint Capital", token: "squarepointcapital" },
    BoardSpec { name: "Flow Traders", token: "flowtraders" },
    BoardSpec { name: "Jump Trading", token: "jumptrading" },
    BoardSpec { name: "Tower Research Capital", token: "towerresearchcapital" },
    BoardSpec { name: "Schonfeld", token: "schonfeld" },
    BoardSpec { name: "IMC Trading", token: "imc" },
    BoardSpec { name: "Man Group", token: "mangroup" },
    BoardSpec { name: "WorldQuant", token: "worldquant" },
    BoardSpec { name: "Graham Capital Management", token: "grahamcapitalmanagement" },
    // Valid boards, currently few matching jobs but worth monitoring
    BoardSpec { name: "AQR", token: "aqr" },
    BoardSpec { name: "Marshall Wace", token: "marshallwace" },
    BoardSpec { name: "Winton", token: "winton" },
    BoardSpec { name: "Akuna Capital", token: "akunacapital" },
    BoardSpec { name: "ExodusPoint", token: "exoduspoint" },
    BoardSpec { name: "PDT Partners", token: "pdtpartners" },
];

pub fn career_url(token: &str) -> String {
    format!("https://boards.greenhouse.io/{token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_board_names_and_tokens_are_unique() {
        let names: HashSet<_> = GREENHOUSE_BOARDS.iter().map(|b| b.name).collect();
        let tokens: HashSet<_> = GREENHOUSE_BOARDS.iter().map(|b| b.token).collect();
        assert_eq!(names.len(), GREENHOUSE_BOARDS.len());
        assert_eq!(tokens.len(), GREENHOUSE_BOARDS.len());
    }
}

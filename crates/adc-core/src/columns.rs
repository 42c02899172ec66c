//! Column-name contracts for every table the pipeline reads or writes.
//!
//! Input files are matched by exact header text. Each table gets a frozen
//! [`TableContract`] listing the headers that must be present and the ones
//! that are recognized but may be missing; contracts are checked once, right
//! after a table is read, so later stages can index columns without
//! re-validating.

use crate::error::{AdcError, AdcResult};

/// Input table file names, by contract name.
pub mod inputs {
    pub const TRANSFER_LINKS: &str = "Transfer Links";
    pub const NTC_INDEX: &str = "NTCs Index";
    pub const NTC_TIMESERIES: &str = "NTCs";

    /// Every table a links run needs, in read order.
    pub const LINKS_TABLES: [&str; 3] = [NTC_INDEX, NTC_TIMESERIES, TRANSFER_LINKS];

    /// File name of a table stored as CSV in the input directory.
    pub fn csv_file_name(table: &str) -> String {
        format!("{table}.csv")
    }
}

/// "Transfer Links" table.
pub mod transfer_links {
    pub const ZONE: &str = "ZONE";
    pub const MARKET_ZONE_SOURCE: &str = "MARKET_ZONE_SOURCE";
    pub const MARKET_ZONE_DESTINATION: &str = "MARKET_ZONE_DESTINATION";
    pub const TRANSFER_TYPE: &str = "TRANSFER_TYPE";
    pub const STUDY_SCENARIO: &str = "STUDY_SCENARIO";
    pub const YEAR_VALID_START: &str = "YEAR_VALID_START";
    pub const YEAR_VALID_END: &str = "YEAR_VALID_END";
    pub const TRANSFER_TECHNOLOGY: &str = "TRANSFER_TECHNOLOGY";
    pub const NTC_LIMIT_CAPACITY_STATIC: &str = "NTC_LIMIT_CAPACITY_STATIC";
    pub const NTC_CURVE_ID: &str = "NTC_CURVE_ID";
    pub const NO_POLES: &str = "NO_POLES";
    pub const FOR: &str = "FOR";
    pub const COMPL: &str = "COMPL";
    pub const FOR_DIRECTION: &str = "FOR_DIRECTION";
    pub const EXCHANGE_FLOW_CURVE_ID: &str = "EXCHANGE_FLOW_CURVE_ID";

    pub const TYPE_NTC: &str = "NTC";
    pub const TECHNOLOGY_HVAC: &str = "HVAC";
}

/// "NTCs Index" table.
pub mod ntc_index {
    pub const CURVE_UID: &str = "CURVE_UID";
    pub const ZONE: &str = "ZONE";
    pub const ID: &str = "ID";
    pub const LABEL: &str = "LABEL";
    pub const COUNT: &str = "COUNT";
}

/// "NTCs" hourly table; every other column is a curve.
pub mod ntc_timeseries {
    pub const MONTH: &str = "MONTH";
    pub const DAY: &str = "DAY";
    pub const HOUR: &str = "HOUR";

    pub const CALENDAR: [&str; 3] = [MONTH, DAY, HOUR];
}

/// Reference workbook sheets and their columns.
pub mod reference {
    pub const SHEET_PAYS: &str = "PAYS";
    pub const SHEET_STUDY_SCENARIO: &str = "STUDY_SCENARIO";
    pub const SHEET_LINKS: &str = "LINKS";
    pub const SHEET_PEAK_PARAMS: &str = "PEAK_PARAMS";

    pub const NOM_PAYS: &str = "Nom_pays";
    pub const CODE_PAYS: &str = "code_pays";
    pub const AREAS: &str = "areas";
    pub const MARKET_NODE: &str = "market_node";
    pub const CODE_ANTARES: &str = "code_antares";

    pub const YEAR: &str = "YEAR";
    pub const STUDY_SCENARIO: &str = "STUDY_SCENARIO";

    pub const HOUR: &str = "hour";
    pub const PERIOD_HOUR: &str = "period_hour";
    pub const MONTH: &str = "month";
    pub const PERIOD_MONTH: &str = "period_month";
}

/// Output workbook columns, in export order.
pub mod export {
    pub const NAME: &str = "Name";
    pub const WINTER_HP_DIRECT: &str = "Winter_HP_Direct_MW";
    pub const WINTER_HP_INDIRECT: &str = "Winter_HP_Indirect_MW";
    pub const WINTER_HC_DIRECT: &str = "Winter_HC_Direct_MW";
    pub const WINTER_HC_INDIRECT: &str = "Winter_HC_Indirect_MW";
    pub const SUMMER_HP_DIRECT: &str = "Summer_HP_Direct_MW";
    pub const SUMMER_HP_INDIRECT: &str = "Summer_HP_Indirect_MW";
    pub const SUMMER_HC_DIRECT: &str = "Summer_HC_Direct_MW";
    pub const SUMMER_HC_INDIRECT: &str = "Summer_HC_Indirect_MW";
    pub const FLOWBASED_PERIMETER: &str = "Flowbased_perimeter";
    pub const HVDC: &str = "HVDC";
    pub const HVDC_DIRECT: &str = "HVDC_Direct";
    pub const HVDC_INDIRECT: &str = "HVDC_Indirect";
    pub const SPECIFIC_TS: &str = "Specific_TS";
    pub const FORCED_OUTAGE_HVAC: &str = "Forced_Outage_HVAC";

    pub const PARAMETERS_SHEET: &str = "parameters";
    pub const HURDLE_COSTS: &str = "Hurdle Costs";
}

/// Required and optional headers of one table.
#[derive(Debug, Clone, Copy)]
pub struct TableContract {
    pub table: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

pub const TRANSFER_LINKS_CONTRACT: TableContract = TableContract {
    table: inputs::TRANSFER_LINKS,
    required: &[
        transfer_links::ZONE,
        transfer_links::MARKET_ZONE_SOURCE,
        transfer_links::MARKET_ZONE_DESTINATION,
        transfer_links::TRANSFER_TYPE,
        transfer_links::STUDY_SCENARIO,
        transfer_links::YEAR_VALID_START,
        transfer_links::YEAR_VALID_END,
        transfer_links::TRANSFER_TECHNOLOGY,
        transfer_links::NTC_CURVE_ID,
    ],
    optional: &[
        transfer_links::NTC_LIMIT_CAPACITY_STATIC,
        transfer_links::NO_POLES,
        transfer_links::FOR,
        transfer_links::COMPL,
        transfer_links::FOR_DIRECTION,
        transfer_links::EXCHANGE_FLOW_CURVE_ID,
    ],
};

pub const NTC_INDEX_CONTRACT: TableContract = TableContract {
    table: inputs::NTC_INDEX,
    required: &[ntc_index::CURVE_UID, ntc_index::ZONE, ntc_index::ID],
    optional: &[ntc_index::LABEL, ntc_index::COUNT],
};

pub const NTC_TIMESERIES_CONTRACT: TableContract = TableContract {
    table: inputs::NTC_TIMESERIES,
    required: &ntc_timeseries::CALENDAR,
    optional: &[],
};

pub const PAYS_CONTRACT: TableContract = TableContract {
    table: reference::SHEET_PAYS,
    required: &[reference::MARKET_NODE, reference::CODE_ANTARES],
    optional: &[
        reference::NOM_PAYS,
        reference::CODE_PAYS,
        reference::AREAS,
    ],
};

pub const STUDY_SCENARIO_CONTRACT: TableContract = TableContract {
    table: reference::SHEET_STUDY_SCENARIO,
    required: &[reference::YEAR, reference::STUDY_SCENARIO],
    optional: &[],
};

pub const LINKS_CONTRACT: TableContract = TableContract {
    table: reference::SHEET_LINKS,
    required: &[reference::MARKET_NODE, reference::CODE_ANTARES],
    optional: &[],
};

pub const PEAK_PARAMS_CONTRACT: TableContract = TableContract {
    table: reference::SHEET_PEAK_PARAMS,
    required: &[
        reference::HOUR,
        reference::PERIOD_HOUR,
        reference::MONTH,
        reference::PERIOD_MONTH,
    ],
    optional: &[],
};

impl TableContract {
    /// Check that every required header is present.
    pub fn validate<S: AsRef<str>>(&self, headers: &[S]) -> AdcResult<()> {
        let missing: Vec<&str> = self
            .required
            .iter()
            .copied()
            .filter(|name| !headers.iter().any(|h| h.as_ref() == *name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AdcError::Validation(format!(
                "table '{}' is missing column(s): {}",
                self.table,
                missing.join(", ")
            )))
        }
    }
}

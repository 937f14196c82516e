//! Sample three-bureau report shared by the integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use report_parser::{ParserConfig, ReportParser};

/// Reference date the fixture's inquiry dates are written against
pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

pub fn parser() -> ReportParser {
    ReportParser::with_config(ParserConfig::default().with_as_of(as_of()))
}

/// Route parser logs to the test harness; repeated calls are harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub const REPORT: &str = r#"<!DOCTYPE html>
<html><body>
<div class="hdr_header">Three Bureau Credit Report ... Reference # 8842-1120</div>
<table class="rpt_content_table rpt_table4column">
  <tr><th></th><th>TransUnion</th><th>Experian</th><th>Equifax</th></tr>
  <tr><td class="label">Balance:</td><td class="info">$1</td><td class="info">$1</td><td class="info">$1</td></tr>
</table>

<div class="sub_header">Personal Information</div>
<table class="rpt_content_table rpt_table4column">
  <tr><th></th><th>TransUnion</th><th>Experian</th><th>Equifax</th></tr>
  <tr><td class="label">Name:</td><td class="info">JANE A DOE</td><td class="info">JANE DOE</td><td class="info">JANE A DOE</td></tr>
  <tr><td class="label">Date of Birth:</td><td class="info">1985</td><td class="info">1985</td><td class="info">1985</td></tr>
  <tr><td class="label">Current Address(es):</td><td class="info">12 PINE ST<br>AUSTIN, TX 78701</td><td class="info">12 PINE ST<br>AUSTIN, TX 78701</td><td class="info">12 PINE ST<br>AUSTIN, TX 78701</td></tr>
  <tr><td class="label">Employers:</td><td class="info"><ul><li>ACME CORP</li></ul></td><td class="info"></td><td class="info"></td></tr>
</table>

<div class="sub_header">Credit Score</div>
<table class="rpt_content_table rpt_table4column">
  <tr><th></th><th>TransUnion</th><th>Experian</th><th>Equifax</th></tr>
  <tr><td class="label">Credit Score:</td><td class="info">702</td><td class="info">688</td><td class="info">715</td></tr>
</table>

<div class="account">
  <div class="sub_header">CAPITAL ONE BANK USA</div>
  <table class="rpt_content_table rpt_table4column">
    <thead><tr><th></th><th class="headerTUC">TransUnion</th><th class="headerEXP">Experian</th><th class="headerEQF">Equifax</th></tr></thead>
    <tbody>
      <tr><td class="label">Account #:</td><td class="info">517805******5544</td><td class="info">517805XXXXXX5544</td><td class="info">517805******5544</td></tr>
      <tr><td class="label">Account Type:</td><td class="info">Revolving</td><td class="info">Revolving</td><td class="info">Revolving</td></tr>
      <tr><td class="label">Account Status / Payment Status:</td><td class="info">Open / Current</td><td class="info">Open / Current</td><td class="info">Current / Late 30 Days</td></tr>
      <tr><td class="label">Balance:</td><td class="info">$1,250.00</td><td class="info">$1,250.00</td><td class="info">$1,250.00</td></tr>
      <tr><td class="label">Past Due:</td><td class="info">$0.00</td><td class="info">$0.00</td><td class="info">$45.00</td></tr>
      <tr><td class="label">Credit Limit:</td><td class="info">$3,000.00</td><td class="info">$3,000.00</td><td class="info">$3,000.00</td></tr>
      <tr><td class="label">Date Opened:</td><td class="info">03/15/2018</td><td class="info">03/15/2018</td><td class="info">03/15/2018</td></tr>
      <tr><td class="label">Last Reported:</td><td class="info">05/31/2024</td><td class="info">05/31/2024</td><td class="info">05/31/2024</td></tr>
      <tr><td class="label">Creditor Remarks:</td><td class="info"></td><td class="info">-</td><td class="info">Account in dispute</td></tr>
    </tbody>
  </table>
  <div class="sub_header">Two-Year payment history</div>
  <table class="addr_hsrty">
    <tr><td class="label">Month</td><td>Apr</td><td>May</td></tr>
    <tr><td class="label">Year</td><td>24</td><td>24</td></tr>
    <tr><td class="label">TransUnion</td><td class="hstry-ok">OK</td><td class="hstry-ok">OK</td></tr>
    <tr><td class="label">Equifax</td><td class="hstry-ok">OK</td><td class="hstry-late">30</td></tr>
  </table>
</div>

<div class="account">
  <div class="sub_header">MIDLAND CREDIT MGMT</div>
  <table class="rpt_content_table rpt_table4column">
    <tr><th></th><th>TransUnion</th><th>Experian</th><th>Equifax</th></tr>
    <tr><td class="label">Account #:</td><td class="info">8800123</td><td class="info"></td><td class="info"></td></tr>
    <tr><td class="label">Account Type:</td><td class="info">Collection</td><td class="info"></td><td class="info"></td></tr>
    <tr><td class="label">Payment Status:</td><td class="info">Collection/Chargeoff</td><td class="info"></td><td class="info"></td></tr>
    <tr><td class="label">Balance:</td><td class="info">$640</td><td class="info"></td><td class="info"></td></tr>
    <tr><td class="label">Date Opened:</td><td class="info">11/2021</td><td class="info"></td><td class="info"></td></tr>
    <tr><td class="label">Last Reported:</td><td class="info">06/01/2024</td><td class="info"></td><td class="info"></td></tr>
    <tr><td class="label">Date of First Delinquency:</td><td class="info">--</td><td class="info"></td><td class="info"></td></tr>
  </table>
</div>

<div class="account">
  <div class="sub_header">CAPITAL ONE BANK USA</div>
  <table class="rpt_content_table rpt_table4column">
    <thead><tr><th></th><th>TransUnion</th><th>Experian</th><th>Equifax</th></tr></thead>
    <tbody>
      <tr><td class="label">Account #:</td><td class="info">517805******5544</td><td class="info">517805XXXXXX5544</td><td class="info">517805******5544</td></tr>
      <tr><td class="label">Account Status / Payment Status:</td><td class="info">Open / Current</td><td class="info">Open / Current</td><td class="info">Current / Late 30 Days</td></tr>
      <tr><td class="label">Balance:</td><td class="info">$1,250.00</td><td class="info">$1,250.00</td><td class="info">$1,250.00</td></tr>
      <tr><td class="label">Past Due:</td><td class="info">$0.00</td><td class="info">$0.00</td><td class="info">$45.00</td></tr>
      <tr><td class="label">Date Opened:</td><td class="info">03/15/2018</td><td class="info">03/15/2018</td><td class="info">03/15/2018</td></tr>
      <tr><td class="label">Last Reported:</td><td class="info">05/31/2024</td><td class="info">05/31/2024</td><td class="info">05/31/2024</td></tr>
    </tbody>
  </table>
</div>

<div class="sub_header">Inquiries</div>
<table class="rpt_content_table">
  <tr><th>Creditor Name</th><th>Type of Business</th><th>Date of inquiry</th><th>Credit Bureau</th></tr>
  <tr ng-repeat="inqPartition in inquiries"><td>SYNCB/AMAZON</td><td>Bank Credit Cards</td><td>04/02/2024</td><td>TransUnion</td></tr>
  <tr ng-repeat="inqPartition in inquiries"><td>CARMAX AUTO</td><td>Automotive</td><td>05/26/2023</td><td>Experian</td></tr>
  <tr ng-repeat="inqPartition in inquiries"><td>WEBBANK</td><td></td><td>01/10/2021</td><td>Equifax</td></tr>
  <tr><td>ALLY FINANCIAL</td><td>Auto Finance</td><td>12/01/2023</td><td>EQF</td></tr>
</table>

<div class="sub_header">Creditor Contacts</div>
<table class="rpt_content_table">
  <tr><th>Creditor Name</th><th>Address</th><th>Phone Number</th></tr>
  <tr><td>CAPITAL ONE BANK USA</td><td>PO BOX 31293 SALT LAKE CITY, UT 84131</td><td>(800) 955-7070</td></tr>
  <tr><td>MIDLAND CREDIT MGMT</td><td>350 CAMINO DE LA REINA, SAN DIEGO, CA 92108</td><td>(800) 296-2657</td></tr>
</table>
</body></html>"#;

/*!

This is the long-form manual for `voter_fraud` and `fraudview`.

## Input format

The input is a table with one row per vote record. The first row holds the column names.
The following columns are required:

| column | content |
|---|---|
| `voter_id` | the identity recognized from the face of the voter |
| `claimed_voter_id` | the identity presented at the polling station, may be empty |
| `registered_constituency` | where the voter is registered |
| `voting_constituency` | where the vote was cast |
| `image_path` | the picture taken at the polling station (file path or `http(s)` URL) |
| `fraud_type` | `legitimate`, `same_constituency_identity_theft`, `cross_constituency_voting` or `double_voting` |
| `is_suspicious` | `True` or `False` |

The column `facenet_embedding` is optional. When present, it contains the face embedding
written as a Python list or tuple, for example `[0.12, -0.5, 0.03]` or `(0.12, -0.5,)`.
Cells that do not start with a bracket are kept as text. The column is read but not used.

Other labels than the four listed above are accepted for `fraud_type`. Such records
count as suspicious only when their `is_suspicious` flag is set, and they do not belong to
any of the specific categories.

Two providers are supported by `fraudview` through the `--input-type` flag:
* `csv` (default) comma-separated values
* `xlsx` Excel workbooks. The first worksheet is read unless `--excel-worksheet-name` is given.

## Categories

| category | voters |
|---|---|
| Same Constituency Identity Theft | `fraud_type` is `same_constituency_identity_theft` |
| Cross-Constituency Voting | `fraud_type` is `cross_constituency_voting` |
| Double Voting | `fraud_type` is `double_voting` |
| All Suspicious Voters | `is_suspicious` is true |

Categories without any voter are not offered for selection. The command line accepts either
the name of a category or its short key (`identity-theft`, `cross-constituency`,
`double-voting`, `all-suspicious`).

## Configuration

`fraudview` accepts an optional JSON configuration file with the `--config` flag:

```json
{
  "outputSettings": {
    "title": "Suspicious Voter Monitoring System",
    "outputPath": "dashboard.html",
    "summaryPath": "summary.json"
  },
  "inputSettings": {
    "filePath": "suspicious_votes.csv",
    "inputType": "csv",
    "imageRoot": "faces"
  },
  "display": {
    "galleryColumns": 4,
    "imageWidth": 150
  }
}
```

All the paths are relative to the directory of the configuration file. The options passed
on the command line take precedence over the configuration file.

## Example

```bash
fraudview -i suspicious_votes.csv --category double-voting --voter 1042 --out dashboard.html
```

*/
